//! Notification of the external tracker after a Feature update.
//!
//! The only implementation starts an Operations Orchestration flow that moves
//! the Octane feature's impacted applications.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::HttpConfig;
use crate::error::SyncError;
use crate::ppm::join_url;

const EXECUTIONS_PATH: &str = "oo/rest/v2/executions";
pub const RUN_NAME: &str = "PPM_Octane_Move_Feature";
const LOG_LEVEL: &str = "STANDARD";

/// Tells the external tracker which systems a Feature now impacts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, feature_url: &str, impacted_systems: &str) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub flow_uuid: String,
    pub run_name: String,
    pub log_level: String,
    pub inputs: ExecutionInputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInputs {
    #[serde(rename = "Impacted_Applications")]
    pub impacted_applications: String,
    #[serde(rename = "Feature_URL")]
    pub feature_url: String,
}

impl ExecutionRequest {
    pub fn move_feature(flow_uuid: &str, feature_url: &str, impacted_systems: &str) -> Self {
        Self {
            flow_uuid: flow_uuid.to_string(),
            run_name: RUN_NAME.to_string(),
            log_level: LOG_LEVEL.to_string(),
            inputs: ExecutionInputs {
                impacted_applications: impacted_systems.to_string(),
                feature_url: feature_url.to_string(),
            },
        }
    }
}

/// [`Notifier`] backed by the OO REST API.
#[derive(Clone)]
pub struct OoNotifier {
    base_url: String,
    auth_key: String,
    flow_uuid: String,
    client: Client,
}

impl std::fmt::Debug for OoNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoNotifier")
            .field("base_url", &self.base_url)
            .field("flow_uuid", &self.flow_uuid)
            .finish_non_exhaustive()
    }
}

impl OoNotifier {
    /// `auth_key` is the pre-encoded basic credential sent as-is.
    pub fn new(
        base_url: impl Into<String>,
        auth_key: impl Into<String>,
        flow_uuid: impl Into<String>,
        config: &HttpConfig,
    ) -> Result<Self, SyncError> {
        let base_url = base_url.into();
        let auth_key = auth_key.into();
        if base_url.trim().is_empty() || auth_key.trim().is_empty() {
            return Err(SyncError::invalid("OO base URL and auth key are both required"));
        }
        Ok(Self {
            base_url,
            auth_key,
            flow_uuid: flow_uuid.into(),
            client: config.build_client()?,
        })
    }
}

#[async_trait]
impl Notifier for OoNotifier {
    async fn notify(&self, feature_url: &str, impacted_systems: &str) -> Result<(), SyncError> {
        let body = ExecutionRequest::move_feature(&self.flow_uuid, feature_url, impacted_systems);
        let response = self
            .client
            .post(join_url(&self.base_url, EXECUTIONS_PATH))
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", self.auth_key))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::ExternalCall {
                call: "OO execution",
                status: status.as_u16(),
                body,
            });
        }

        let execution = response.text().await.unwrap_or_default();
        tracing::info!(
            "Started OO flow {} for {} (execution {})",
            self.flow_uuid,
            feature_url,
            execution.trim()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn execution_body_matches_oo_shape() {
        let body = ExecutionRequest::move_feature("flow-1", "https://octane/f/7", "OMS;CRM");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "flowUuid": "flow-1",
                "runName": "PPM_Octane_Move_Feature",
                "logLevel": "STANDARD",
                "inputs": {
                    "Impacted_Applications": "OMS;CRM",
                    "Feature_URL": "https://octane/f/7"
                }
            })
        );
    }

    #[test]
    fn requires_credentials() {
        let err = OoNotifier::new("https://oo", "", "flow", &HttpConfig::default()).unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
    }
}
