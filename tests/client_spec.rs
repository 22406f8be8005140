//! HTTP adapter tests against an in-process fake of the PPM and OO endpoints.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use ia_feature_sync::config::HttpConfig;
use ia_feature_sync::notify::{Notifier, OoNotifier};
use ia_feature_sync::payload::{CreateRequestPayload, FieldSet, UpdateRequestPayload};
use ia_feature_sync::ppm::{PpmClient, QueryRunner, RequestWriter, CHILD_RELATION};
use ia_feature_sync::SyncError;

/// base64("svc:pw")
const BASIC_CREDENTIAL: &str = "Basic c3ZjOnB3";

#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: String,
}

impl Call {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

async fn handle(
    State(recorder): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let post = method == Method::POST;
    let put = method == Method::PUT;
    recorder.calls.lock().unwrap().push(Call {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    match path.as_str() {
        "/itg/rest2/sqlRunner/runSqlQuery" if post => Json(json!({
            "columnHeaders": ["VISIBLE_USER_DATA1", "ESTIMATE"],
            "results": [
                { "values": ["Billing", 40] },
                { "values": ["CRM", null] }
            ]
        }))
        .into_response(),
        "/itg/rest2/dm/requests" if post => Json(json!({ "id": 60123 })).into_response(),
        "/itg/rest2/dm/requests/999" if put => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Server exploded").into_response()
        }
        p if put && p.starts_with("/itg/rest2/dm/requests/") => Json(json!({})).into_response(),
        "/oo/rest/v2/executions" if post => (StatusCode::CREATED, "104857").into_response(),
        "/oo-down/oo/rest/v2/executions" if post => {
            (StatusCode::UNAUTHORIZED, "bad key").into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the fake and return its root URL (with trailing slash).
async fn spawn_fake(recorder: Recorder) -> String {
    let app = Router::new().fallback(handle).with_state(recorder);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

async fn ppm_client(recorder: &Recorder) -> PpmClient {
    let root = spawn_fake(recorder.clone()).await;
    PpmClient::new(format!("{}itg/", root), "svc", "pw", &HttpConfig::default()).unwrap()
}

mod ppm_client {
    use super::*;

    #[tokio::test]
    async fn runs_sql_with_auth_and_ppm_headers() {
        let recorder = Recorder::default();
        let client = ppm_client(&recorder).await;

        let result = client.run("SELECT 1 FROM dual").await.unwrap();
        assert_eq!(result.columns, vec!["VISIBLE_USER_DATA1", "ESTIMATE"]);
        assert_eq!(result.first_column(), vec!["Billing", "CRM"]);
        assert_eq!(result.rows[0][1].as_deref(), Some("40"));
        assert_eq!(result.rows[1][1], None);

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].json(), json!({ "querySql": "SELECT 1 FROM dual" }));
        assert_eq!(calls[0].header("authorization"), Some(BASIC_CREDENTIAL));
        assert_eq!(calls[0].header("accept"), Some("application/json"));
        assert_eq!(calls[0].header("ephemeral"), Some("true"));
    }

    #[tokio::test]
    async fn creates_a_request_and_returns_its_id() {
        let recorder = Recorder::default();
        let client = ppm_client(&recorder).await;

        let mut fields = FieldSet::new();
        fields.push_string("REQ.IS_DOMAIN", "Billing");
        let id = client
            .create(&CreateRequestPayload::feature(fields))
            .await
            .unwrap();
        assert_eq!(id, "60123");

        let body = recorder.calls()[0].json();
        assert_eq!(body["requestType"], "IS PMO Feature");
        assert_eq!(body["sourceType"], "INTERFACE_RI");
        assert_eq!(
            body["fields"]["field"][0],
            json!({ "token": "REQ.IS_DOMAIN", "stringValue": ["Billing"] })
        );
    }

    #[tokio::test]
    async fn updates_a_request_by_id() {
        let recorder = Recorder::default();
        let client = ppm_client(&recorder).await;

        client
            .update("70001", &UpdateRequestPayload { fields: FieldSet::new() })
            .await
            .unwrap();

        let calls = recorder.calls();
        assert_eq!(calls[0].method, Method::PUT);
        assert_eq!(calls[0].path, "/itg/rest2/dm/requests/70001");
    }

    #[tokio::test]
    async fn links_all_targets_in_one_call() {
        let recorder = Recorder::default();
        let client = ppm_client(&recorder).await;

        client
            .link(
                "50001",
                &["60123".to_string(), "60124".to_string()],
                CHILD_RELATION,
            )
            .await
            .unwrap();

        let calls = recorder.calls();
        assert_eq!(
            calls[0].path,
            "/itg/rest2/dm/requests/50001/addReference/60123,60124/%7BrefRelName%7D"
        );
        assert_eq!(calls[0].query.as_deref(), Some("refRelName=CHILD"));
    }

    #[tokio::test]
    async fn link_with_no_targets_makes_no_call() {
        let recorder = Recorder::default();
        let client = ppm_client(&recorder).await;

        client.link("50001", &[], CHILD_RELATION).await.unwrap();
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_an_external_call_failure() {
        let recorder = Recorder::default();
        let client = ppm_client(&recorder).await;

        let err = client
            .update("999", &UpdateRequestPayload { fields: FieldSet::new() })
            .await
            .unwrap_err();

        match err {
            SyncError::ExternalCall { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Server exploded");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let client = PpmClient::new(
            "http://127.0.0.1:1/itg/",
            "svc",
            "pw",
            &HttpConfig::default(),
        )
        .unwrap();

        let err = client.run("SELECT 1 FROM dual").await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));
    }
}

mod oo_notifier {
    use super::*;

    #[tokio::test]
    async fn starts_the_move_feature_flow() {
        let recorder = Recorder::default();
        let root = spawn_fake(recorder.clone()).await;
        let notifier = OoNotifier::new(root, "b286cHc=", "flow-1", &HttpConfig::default()).unwrap();

        notifier
            .notify("https://octane.example.com/f/1", "BSCS;Kenan")
            .await
            .unwrap();

        let calls = recorder.calls();
        assert_eq!(calls[0].path, "/oo/rest/v2/executions");
        assert_eq!(calls[0].header("authorization"), Some("Basic b286cHc="));
        assert_eq!(
            calls[0].json(),
            json!({
                "flowUuid": "flow-1",
                "runName": "PPM_Octane_Move_Feature",
                "logLevel": "STANDARD",
                "inputs": {
                    "Impacted_Applications": "BSCS;Kenan",
                    "Feature_URL": "https://octane.example.com/f/1"
                }
            })
        );
    }

    #[tokio::test]
    async fn rejected_execution_is_an_external_call_failure() {
        let recorder = Recorder::default();
        let root = spawn_fake(recorder.clone()).await;
        let notifier = OoNotifier::new(
            format!("{}oo-down", root),
            "bad",
            "flow-1",
            &HttpConfig::default(),
        )
        .unwrap();

        let err = notifier
            .notify("https://octane.example.com/f/1", "BSCS")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
