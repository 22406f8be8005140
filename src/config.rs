//! Runtime configuration for the HTTP collaborators.

use std::time::Duration;

use crate::error::SyncError;

pub const CONNECT_TIMEOUT_ENV: &str = "IAFS_CONNECT_TIMEOUT_SECS";
pub const READ_TIMEOUT_ENV: &str = "IAFS_READ_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "IAFS_REQUEST_TIMEOUT_SECS";
pub const OO_FLOW_UUID_ENV: &str = "IAFS_OO_FLOW_UUID";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OO flow that moves an Octane feature's impacted applications.
pub const DEFAULT_OO_FLOW_UUID: &str = "538549a6-6ddb-42fd-bf39-c46fd5040eab";

/// Timeouts applied to every PPM and OO call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Longest wait between two reads of the response.
    pub read_timeout: Duration,
    /// Bound on a whole request, from connect to the last response byte.
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl HttpConfig {
    /// Load timeouts from environment variables, falling back to defaults
    /// for unset or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            connect_timeout: secs(CONNECT_TIMEOUT_ENV, DEFAULT_CONNECT_TIMEOUT),
            read_timeout: secs(READ_TIMEOUT_ENV, DEFAULT_READ_TIMEOUT),
            request_timeout: secs(REQUEST_TIMEOUT_ENV, DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Build a reqwest client with these timeouts.
    pub fn build_client(&self) -> Result<reqwest::Client, SyncError> {
        Ok(reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .timeout(self.request_timeout)
            .build()?)
    }
}

/// OO flow to run, overridable through [`OO_FLOW_UUID_ENV`].
pub fn oo_flow_uuid() -> String {
    std::env::var(OO_FLOW_UUID_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OO_FLOW_UUID.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        assert_eq!(HttpConfig::from_lookup(|_| None), HttpConfig::default());
    }

    #[test]
    fn reads_seconds_and_ignores_garbage() {
        let config = HttpConfig::from_lookup(|key| match key {
            CONNECT_TIMEOUT_ENV => Some("5".to_string()),
            READ_TIMEOUT_ENV => Some(" 12 ".to_string()),
            REQUEST_TIMEOUT_ENV => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(12));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn zero_is_not_a_timeout() {
        let config = HttpConfig::from_lookup(|key| {
            (key == CONNECT_TIMEOUT_ENV).then(|| "0".to_string())
        });
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn builds_a_client_with_every_timeout() {
        let config = HttpConfig {
            read_timeout: Duration::from_secs(1),
            ..HttpConfig::default()
        };
        assert!(config.build_client().is_ok());
    }
}
