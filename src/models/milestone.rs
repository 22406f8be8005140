use serde::{Deserialize, Serialize};

use super::ValueMap;
use crate::error::SyncError;

/// A major milestone of the IT project's work plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Position in the work plan, as supplied by the source.
    pub sequence: u32,
    pub name: String,
    pub scheduled_finish: Option<String>,
    pub actual_finish: Option<String>,
    pub status: Option<String>,
}

impl Milestone {
    pub const SEQUENCE_COLUMN: &'static str = "MILESTONE_SEQ";
    pub const NAME_COLUMN: &'static str = "MILESTONE_TASK_NAME";
    pub const SCHEDULED_COLUMN: &'static str = "MILESTONE_SCHED_FINISH";
    pub const ACTUAL_COLUMN: &'static str = "MILESTONE_ACTUAL_FINISH";
    pub const STATUS_COLUMN: &'static str = "MILESTONE_TASK_STATUS";

    pub fn from_row(row: &ValueMap) -> Result<Self, SyncError> {
        let name = row
            .get(Self::NAME_COLUMN)
            .ok_or_else(|| SyncError::malformed("milestone row has no task name"))?;
        let sequence = row
            .get(Self::SEQUENCE_COLUMN)
            .ok_or_else(|| SyncError::malformed(format!("milestone '{}' has no sequence", name)))?
            .trim()
            .parse()
            .map_err(|e| {
                SyncError::malformed(format!("milestone '{}' sequence: {}", name, e))
            })?;
        let text = |column: &str| row.get(column).map(str::to_string);

        Ok(Self {
            sequence,
            name: name.to_string(),
            scheduled_finish: text(Self::SCHEDULED_COLUMN),
            actual_finish: text(Self::ACTUAL_COLUMN),
            status: text(Self::STATUS_COLUMN),
        })
    }
}

/// Order milestones by their work-plan sequence. Ties keep source order.
pub fn sort_milestones(milestones: &mut [Milestone]) {
    milestones.sort_by_key(|m| m.sequence);
}
