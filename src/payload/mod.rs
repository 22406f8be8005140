//! IS PMO Feature request payloads.
//!
//! - [`catalog`]: which metadata column feeds which request token.
//! - [`table_render`]: HTML tables that fit a PPM long-text field.
//! - [`synthesize_create`] / [`synthesize_update`]: pure builders for the
//!   create and update request bodies.

pub mod catalog;
pub mod table_render;

mod synthesize;

pub use synthesize::*;

use serde::{Deserialize, Serialize};

/// Request type of the Features this crate creates.
pub const FEATURE_REQUEST_TYPE: &str = "IS PMO Feature";
/// Source type PPM records for requests created over REST.
pub const SOURCE_TYPE: &str = "INTERFACE_RI";

/// The value of one request token.
///
/// Serialized flattened into its [`Field`], giving either
/// `{"token": ..., "stringValue": [...]}` or `{"token": ..., "dateValue": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    StringValue(Vec<String>),
    DateValue(String),
}

impl FieldValue {
    /// The first string value, or the date value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::StringValue(values) => values.first().map(String::as_str),
            Self::DateValue(date) => Some(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub token: String,
    #[serde(flatten)]
    pub value: FieldValue,
}

/// Ordered list of request fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    field: Vec<Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_string(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.field.push(Field {
            token: token.into(),
            value: FieldValue::StringValue(vec![value.into()]),
        });
    }

    pub fn push_date(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.field.push(Field {
            token: token.into(),
            value: FieldValue::DateValue(value.into()),
        });
    }

    pub fn get(&self, token: &str) -> Option<&FieldValue> {
        self.field
            .iter()
            .find(|f| f.token == token)
            .map(|f| &f.value)
    }

    /// Text of `token`'s value, if the token is set.
    pub fn text(&self, token: &str) -> Option<&str> {
        self.get(token).and_then(FieldValue::as_text)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.field.iter().map(|f| f.token.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.field.iter()
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}

/// Body of `POST rest2/dm/requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    pub fields: FieldSet,
    pub source_type: String,
    pub request_type: String,
}

impl CreateRequestPayload {
    pub fn feature(fields: FieldSet) -> Self {
        Self {
            fields,
            source_type: SOURCE_TYPE.to_string(),
            request_type: FEATURE_REQUEST_TYPE.to_string(),
        }
    }
}

/// Body of `PUT rest2/dm/requests/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequestPayload {
    pub fields: FieldSet,
}
