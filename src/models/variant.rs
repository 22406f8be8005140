use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// The IT project's request type, which decides the metadata it exposes.
///
/// - `Epmo`: linked to an EPMO programme; exposes the EPMO reference and is
///   the only variant whose EPMO project record is read.
/// - `Ktlo`: keep-the-lights-on work; the source query blanks every EPMO and
///   priority column.
/// - `ReportingAndAnalytics`, `Infrastructure`: expose the EPMO reference on
///   the project itself but have no EPMO project record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectVariant {
    Epmo,
    Ktlo,
    ReportingAndAnalytics,
    Infrastructure,
}

impl ProjectVariant {
    pub const ALL: [ProjectVariant; 4] = [
        Self::Epmo,
        Self::Ktlo,
        Self::ReportingAndAnalytics,
        Self::Infrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epmo => "epmo",
            Self::Ktlo => "ktlo",
            Self::ReportingAndAnalytics => "reporting-and-analytics",
            Self::Infrastructure => "infrastructure",
        }
    }

    /// The PPM request type name of the IT project.
    pub fn request_type_name(&self) -> &'static str {
        match self {
            Self::Epmo => "IS PMO IT-EPMO Project",
            Self::Ktlo => "IS PMO IT-KTLO Project",
            Self::ReportingAndAnalytics => "IS PMO IT-Reporting and Analytics Project",
            Self::Infrastructure => "IS PMO IT-Infrastructure Project",
        }
    }

    /// Whether the project record carries an EPMO programme number.
    pub fn exposes_epmo_reference(&self) -> bool {
        !matches!(self, Self::Ktlo)
    }

    /// Whether the EPMO project record is queried and merged.
    pub fn sources_epmo_project(&self) -> bool {
        matches!(self, Self::Epmo)
    }
}

impl fmt::Display for ProjectVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.request_type_name())
    }
}

impl FromStr for ProjectVariant {
    type Err = SyncError;

    /// Accepts either the PPM request type name or the short slug,
    /// ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| {
                s.eq_ignore_ascii_case(v.as_str()) || s.eq_ignore_ascii_case(v.request_type_name())
            })
            .ok_or_else(|| SyncError::invalid(format!("unknown project request type '{}'", s)))
    }
}
