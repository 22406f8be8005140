//! PPM collaborators: SQL queries and request writes.
//!
//! The sync core only talks to PPM through [`QueryRunner`] and
//! [`RequestWriter`]. [`PpmClient`] implements both over the PPM REST API;
//! tests substitute in-memory fakes.

mod client;
pub mod sql;
mod types;

pub use client::*;
pub use types::*;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::models::ValueMap;
use crate::payload::{CreateRequestPayload, UpdateRequestPayload};

/// Relationship used to link new Features under their assessment.
pub const CHILD_RELATION: &str = "CHILD";

/// Column-labelled rows returned by a SQL query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row as a column-name → value map.
    pub fn maps(&self) -> Vec<ValueMap> {
        self.rows
            .iter()
            .map(|row| ValueMap::from_row(&self.columns, row))
            .collect()
    }

    /// The first row as a map, if there is one.
    pub fn first_map(&self) -> Option<ValueMap> {
        self.rows
            .first()
            .map(|row| ValueMap::from_row(&self.columns, row))
    }

    /// Present values of the first column, one per row.
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first().cloned().flatten())
            .filter(|v| crate::models::is_present(Some(v.as_str())))
            .collect()
    }
}

/// Runs SQL against the PPM schema.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, sql: &str) -> Result<QueryResult, SyncError>;
}

/// Creates, updates and links PPM requests.
#[async_trait]
pub trait RequestWriter: Send + Sync {
    /// Create a request and return its id.
    async fn create(&self, payload: &CreateRequestPayload) -> Result<String, SyncError>;

    async fn update(&self, request_id: &str, payload: &UpdateRequestPayload)
        -> Result<(), SyncError>;

    /// Add `targets` as references of `source` under `relation`.
    async fn link(&self, source: &str, targets: &[String], relation: &str)
        -> Result<(), SyncError>;
}

/// Join a base URL and a relative path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
