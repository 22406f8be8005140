use thiserror::Error;

/// Errors that terminate a sync run.
///
/// None of these are retried or downgraded: they propagate to the entry point
/// and abort the run. Features already created before the failure stay; a
/// re-run recomputes the missing domains and picks up where this one stopped.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required value was missing or unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An external endpoint answered with a non-success status.
    #[error("{call} failed: HTTP {status}: {body}")]
    ExternalCall {
        call: &'static str,
        status: u16,
        body: String,
    },

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response arrived but did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl SyncError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ExternalCall { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse(e.to_string())
    }
}
