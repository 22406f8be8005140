//! Wire types of the PPM REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::QueryResult;
use crate::error::SyncError;

/// Body of `POST rest2/sqlRunner/runSqlQuery`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlQueryRequest {
    pub query_sql: String,
}

/// Response of the SQL runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlQueryResponse {
    #[serde(default)]
    pub column_headers: Vec<String>,
    #[serde(default)]
    pub results: Vec<SqlResultRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlResultRow {
    #[serde(default)]
    pub values: Vec<Value>,
}

impl TryFrom<SqlQueryResponse> for QueryResult {
    type Error = SyncError;

    /// Strings pass through, numbers and booleans are rendered as text and
    /// JSON `null` becomes an absent value. Rows must match the header width.
    fn try_from(response: SqlQueryResponse) -> Result<Self, Self::Error> {
        let width = response.column_headers.len();
        let rows = response
            .results
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                if row.values.len() != width {
                    return Err(SyncError::malformed(format!(
                        "SQL result row {} has {} values for {} columns",
                        i,
                        row.values.len(),
                        width
                    )));
                }
                row.values
                    .into_iter()
                    .map(cell_text)
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult {
            columns: response.column_headers,
            rows,
        })
    }
}

fn cell_text(value: Value) -> Result<Option<String>, SyncError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(SyncError::malformed(format!(
            "unexpected SQL result value {}",
            other
        ))),
    }
}

/// Response of `POST rest2/dm/requests`. PPM returns the id as a string on
/// some versions and as a number on others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRequest {
    pub id: Value,
}

impl CreatedRequest {
    pub fn request_id(&self) -> Result<String, SyncError> {
        match &self.id {
            Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(SyncError::malformed(format!(
                "created request has no usable id: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_sql_runner_response() {
        let response: SqlQueryResponse = serde_json::from_value(json!({
            "columnHeaders": ["ISPMO_PRJ_NUM", "ISPMO_PRJ_PHASE", "COUNT"],
            "results": [{ "values": ["1001", null, 3] }]
        }))
        .unwrap();

        let result = QueryResult::try_from(response).unwrap();
        assert_eq!(result.columns.len(), 3);
        assert_eq!(
            result.rows[0],
            vec![Some("1001".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let response: SqlQueryResponse = serde_json::from_value(json!({
            "columnHeaders": ["A", "B"],
            "results": [{ "values": ["1"] }]
        }))
        .unwrap();

        let err = QueryResult::try_from(response).unwrap_err();
        assert!(matches!(err, SyncError::MalformedResponse(_)));
    }

    #[test]
    fn empty_result_has_no_rows() {
        let response: SqlQueryResponse =
            serde_json::from_value(json!({ "columnHeaders": ["A"], "results": [] })).unwrap();
        assert!(QueryResult::try_from(response).unwrap().is_empty());
    }

    #[test]
    fn created_id_may_be_numeric() {
        let created: CreatedRequest = serde_json::from_value(json!({ "id": 60123 })).unwrap();
        assert_eq!(created.request_id().unwrap(), "60123");

        let created: CreatedRequest = serde_json::from_value(json!({ "id": "60124" })).unwrap();
        assert_eq!(created.request_id().unwrap(), "60124");

        let created: CreatedRequest = serde_json::from_value(json!({ "id": null })).unwrap();
        assert!(created.request_id().is_err());
    }
}
