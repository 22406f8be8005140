use serde::{Deserialize, Serialize};

use super::ValueMap;
use crate::error::SyncError;

/// One row of the assessment's Impacted Systems table.
///
/// There is one instance per (impacted system, domain) pairing. The query that
/// produces them orders by domain, then system name, and that order is kept
/// through partitioning and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactedSystem {
    /// Octane workspace the system's work is tracked in.
    pub workspace_ref: String,
    pub domain: String,
    pub system_name: String,
    pub involvement: String,
    /// Estimated effort, kept as the text the assessment holds.
    pub estimate_hours: String,
}

impl ImpactedSystem {
    pub const WORKSPACE_COLUMN: &'static str = "OCTANE_WORKSPACE";
    pub const DOMAIN_COLUMN: &'static str = "IS_DOMAIN";
    pub const SYSTEM_COLUMN: &'static str = "IMPACTED_SYSTEM";
    pub const INVOLVEMENT_COLUMN: &'static str = "INVOLVEMENT";
    pub const ESTIMATE_COLUMN: &'static str = "ESTIMATE_HOURS";

    /// Read a row of the impacted-systems query.
    ///
    /// Domain and system name are mandatory; the descriptive columns default
    /// to empty text when the assessment leaves them blank.
    pub fn from_row(row: &ValueMap) -> Result<Self, SyncError> {
        let required = |column: &str| {
            row.get(column).map(str::to_string).ok_or_else(|| {
                SyncError::malformed(format!("impacted system row has no {}", column))
            })
        };
        let optional = |column: &str| row.get(column).unwrap_or_default().to_string();

        Ok(Self {
            workspace_ref: optional(Self::WORKSPACE_COLUMN),
            domain: required(Self::DOMAIN_COLUMN)?,
            system_name: required(Self::SYSTEM_COLUMN)?,
            involvement: optional(Self::INVOLVEMENT_COLUMN),
            estimate_hours: optional(Self::ESTIMATE_COLUMN),
        })
    }
}
