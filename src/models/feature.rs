use serde::{Deserialize, Serialize};

use super::ValueMap;
use crate::error::SyncError;

/// Domain label of the cross-cutting testing Feature.
///
/// A Feature in this domain is refreshed with every impacted system on the
/// assessment, not only the systems labelled with its own domain.
pub const TEST_AUTOMATION_DOMAIN: &str = "Test Automation";

/// An IS PMO Feature already linked to the project.
///
/// Features are never created from this type; new ones are created through
/// the request API and only referenced by the id it hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub request_id: String,
    pub domain: String,
    /// Octane feature the PPM Feature is mirrored to, if any.
    pub external_tracker_url: Option<String>,
}

impl Feature {
    pub const REQUEST_ID_COLUMN: &'static str = "FEATURE_REQUEST_ID";
    pub const DOMAIN_COLUMN: &'static str = "FEATURE_IS_DOMAIN";
    pub const TRACKER_URL_COLUMN: &'static str = "OCTANE_FEATURE_URL";

    pub fn from_row(row: &ValueMap) -> Result<Self, SyncError> {
        let required = |column: &str| {
            row.get(column)
                .map(str::to_string)
                .ok_or_else(|| SyncError::malformed(format!("feature row has no {}", column)))
        };

        Ok(Self {
            request_id: required(Self::REQUEST_ID_COLUMN)?,
            domain: required(Self::DOMAIN_COLUMN)?,
            external_tracker_url: row.get(Self::TRACKER_URL_COLUMN).map(str::to_string),
        })
    }

    pub fn is_test_automation(&self) -> bool {
        self.domain.eq_ignore_ascii_case(TEST_AUTOMATION_DOMAIN)
    }

    /// The impacted systems this Feature carries, in source order.
    pub fn select_systems<'a>(
        &self,
        systems: &'a [super::ImpactedSystem],
    ) -> Vec<&'a super::ImpactedSystem> {
        if self.is_test_automation() {
            return systems.iter().collect();
        }
        systems
            .iter()
            .filter(|s| s.domain.eq_ignore_ascii_case(&self.domain))
            .collect()
    }
}
