//! HTTP client for the PPM REST API.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use super::{join_url, CreatedRequest, QueryResult, QueryRunner, RequestWriter};
use super::{SqlQueryRequest, SqlQueryResponse};
use crate::config::HttpConfig;
use crate::error::SyncError;
use crate::payload::{CreateRequestPayload, UpdateRequestPayload};

const SQL_RUNNER_PATH: &str = "rest2/sqlRunner/runSqlQuery";
const REQUESTS_PATH: &str = "rest2/dm/requests";
/// Trailing segment of the add-reference path: the literal `{refRelName}`
/// template, percent-encoded. PPM reads the relation from the query string.
const RELATION_SEGMENT: &str = "%7BrefRelName%7D";

/// Client for one PPM instance, authenticated with basic auth.
#[derive(Clone)]
pub struct PpmClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl std::fmt::Debug for PpmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PpmClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl PpmClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        config: &HttpConfig,
    ) -> Result<Self, SyncError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(SyncError::invalid("PPM base URL is required"));
        }
        Ok(Self {
            base_url,
            username: username.into(),
            password: password.into(),
            client: config.build_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with auth and the headers PPM expects on every call.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, join_url(&self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .header("Ephemeral", "true")
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        call: &'static str,
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::ExternalCall {
                call,
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| SyncError::malformed(format!("{} response: {}", call, e)))
    }

    /// Handle a response whose body is ignored on success.
    async fn handle_empty_response(
        &self,
        call: &'static str,
        response: reqwest::Response,
    ) -> Result<(), SyncError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SyncError::ExternalCall {
                call,
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl QueryRunner for PpmClient {
    async fn run(&self, sql: &str) -> Result<QueryResult, SyncError> {
        tracing::debug!("Running SQL: {}", sql);
        let response = self
            .request(Method::POST, SQL_RUNNER_PATH)
            .json(&SqlQueryRequest {
                query_sql: sql.to_string(),
            })
            .send()
            .await?;
        let response: SqlQueryResponse = self.handle_response("SQL query", response).await?;
        QueryResult::try_from(response)
    }
}

#[async_trait]
impl RequestWriter for PpmClient {
    async fn create(&self, payload: &CreateRequestPayload) -> Result<String, SyncError> {
        let response = self
            .request(Method::POST, REQUESTS_PATH)
            .json(payload)
            .send()
            .await?;
        let created: CreatedRequest = self.handle_response("Create request", response).await?;
        let id = created.request_id()?;
        tracing::info!("Created {} request {}", payload.request_type, id);
        Ok(id)
    }

    async fn update(
        &self,
        request_id: &str,
        payload: &UpdateRequestPayload,
    ) -> Result<(), SyncError> {
        let response = self
            .request(Method::PUT, &format!("{}/{}", REQUESTS_PATH, request_id))
            .json(payload)
            .send()
            .await?;
        self.handle_empty_response("Update request", response).await?;
        tracing::info!("Updated request {}", request_id);
        Ok(())
    }

    async fn link(&self, source: &str, targets: &[String], relation: &str) -> Result<(), SyncError> {
        if targets.is_empty() {
            return Ok(());
        }
        let path = format!(
            "{}/{}/addReference/{}/{}",
            REQUESTS_PATH,
            source,
            targets.join(","),
            RELATION_SEGMENT
        );
        let response = self
            .request(Method::PUT, &path)
            .query(&[("refRelName", relation)])
            .send()
            .await?;
        self.handle_empty_response("Add reference", response).await?;
        tracing::info!(
            "Linked {} request(s) to {} as {}",
            targets.len(),
            source,
            relation
        );
        Ok(())
    }
}
