//! Test helper utilities: a scripted stand-in for PDF.co, Supabase and the
//! embedder, plus a running instance of the orchestrator wired to it.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::sleep;

use pdf_extract_orchestrator::app_state::AppState;
use pdf_extract_orchestrator::routes;
use pdf_extract_orchestrator::services::conversion::PdfCoClient;
use pdf_extract_orchestrator::services::document_store::SupabaseDocumentStore;
use pdf_extract_orchestrator::services::notifier::EmbedderNotifier;
use pdf_extract_orchestrator::services::tracker::PollPolicy;

pub const API_KEY: &str = "test-pdfco-key";
pub const SERVICE_KEY: &str = "test-service-role-key";

/// Response from POST /extract-text on success
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub doc_id: String,
    pub job_id: String,
    pub status: String,
}

/// Response from POST /extract-text on failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// How the fake PDF.co answers a submission.
#[derive(Debug, Clone)]
pub enum SubmitBehavior {
    /// `jobId = J1`, result served by this mock under `/results/J1`.
    Accept,
    /// `error: true` with the given message.
    Reject(&'static str),
    /// Success body without a result `url`.
    MissingUrl,
    /// HTTP 500 with an HTML error page.
    ServerError,
    /// HTTP 400 with `error: false` and no message.
    BadRequestWithoutMessage,
}

/// A failed job check, served before any scripted status.
#[derive(Debug, Clone, Copy)]
pub enum CheckFault {
    /// HTTP 503.
    Unavailable,
    /// HTTP 200 with a body that is not JSON.
    NotJson,
}

#[derive(Debug, Clone)]
pub struct MockScript {
    pub submit: SubmitBehavior,
    /// Faults returned by the first job checks, in order.
    pub check_faults: Vec<CheckFault>,
    /// Statuses returned by successive job checks.
    pub statuses: Vec<&'static str>,
    /// Status returned once `statuses` is drained.
    pub fallback_status: &'static str,
    pub result_status: u16,
    pub result_body: &'static str,
    pub embedder_status: u16,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            submit: SubmitBehavior::Accept,
            check_faults: Vec::new(),
            statuses: Vec::new(),
            fallback_status: "success",
            result_status: 200,
            result_body: "Hello world",
            embedder_status: 200,
        }
    }
}

/// One PATCH received by the fake Supabase.
#[derive(Debug, Clone)]
pub struct RecordedPatch {
    pub table: String,
    pub filter: Option<String>,
    pub apikey: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

struct MockState {
    script: MockScript,
    base_url: String,
    statuses: Mutex<VecDeque<&'static str>>,
    check_faults: Mutex<VecDeque<CheckFault>>,
    events: Mutex<Vec<String>>,
    submissions: Mutex<Vec<(Option<String>, Value)>>,
    checks: Mutex<Vec<Value>>,
    patches: Mutex<Vec<RecordedPatch>>,
}

impl MockState {
    fn log(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

pub struct MockUpstream {
    pub base_url: String,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    /// Start the fake upstream on an ephemeral port.
    pub async fn start(script: MockScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(MockState {
            statuses: Mutex::new(script.statuses.iter().copied().collect()),
            check_faults: Mutex::new(script.check_faults.iter().copied().collect()),
            script,
            base_url: base_url.clone(),
            events: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            checks: Mutex::new(Vec::new()),
            patches: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/pdf/convert/to/text", post(pdfco_submit))
            .route("/v1/job/check", post(pdfco_check))
            .route("/results/{job_id}", get(pdfco_result))
            .route("/rest/v1/{table}", patch(supabase_patch))
            .route("/embed", post(embedder))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base_url,
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.state.events.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<(Option<String>, Value)> {
        self.state.submissions.lock().unwrap().clone()
    }

    pub fn checks(&self) -> Vec<Value> {
        self.state.checks.lock().unwrap().clone()
    }

    pub fn patches(&self) -> Vec<RecordedPatch> {
        self.state.patches.lock().unwrap().clone()
    }

    pub fn embeds(&self) -> usize {
        self.events().iter().filter(|e| *e == "embed").count()
    }

    /// Wait until the orchestrator has issued `count` document updates.
    pub async fn wait_for_patches(&self, count: usize) -> Vec<RecordedPatch> {
        for _ in 0..500 {
            let patches = self.patches();
            if patches.len() >= count {
                // Let a trailing embedder call land before assertions.
                sleep(Duration::from_millis(50)).await;
                return self.patches();
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {count} document updates, got {:?}",
            self.patches()
        );
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn pdfco_submit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.log("submit");
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.submissions.lock().unwrap().push((api_key, body));

    match &state.script.submit {
        SubmitBehavior::Accept => Json(json!({
            "jobId": "J1",
            "url": format!("{}/results/J1", state.base_url),
            "status": "working",
            "error": false
        }))
        .into_response(),
        SubmitBehavior::Reject(message) => Json(json!({
            "error": true,
            "status": 400,
            "message": message
        }))
        .into_response(),
        SubmitBehavior::MissingUrl => Json(json!({
            "jobId": "J1",
            "status": "working",
            "error": false
        }))
        .into_response(),
        SubmitBehavior::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html><body>Internal Server Error</body></html>",
        )
            .into_response(),
        SubmitBehavior::BadRequestWithoutMessage => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": false }))).into_response()
        }
    }
}

async fn pdfco_check(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    state.log("check");
    state.checks.lock().unwrap().push(body);

    let fault = state.check_faults.lock().unwrap().pop_front();
    match fault {
        Some(CheckFault::Unavailable) => {
            return (StatusCode::SERVICE_UNAVAILABLE, "upstream busy").into_response();
        }
        Some(CheckFault::NotJson) => {
            return (StatusCode::OK, "<html>maintenance</html>").into_response();
        }
        None => {}
    }

    let next = state.statuses.lock().unwrap().pop_front();
    let status = next.unwrap_or(state.script.fallback_status);
    Json(json!({ "status": status, "jobId": "J1" })).into_response()
}

async fn pdfco_result(
    State(state): State<Arc<MockState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    state.log(format!("result:{job_id}"));
    let status = StatusCode::from_u16(state.script.result_status).unwrap();
    (status, state.script.result_body)
}

async fn supabase_patch(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let status = body
        .get("extraction_status")
        .and_then(Value::as_str)
        .unwrap_or("none")
        .to_string();
    state.log(format!("patch:{status}"));

    state.patches.lock().unwrap().push(RecordedPatch {
        table,
        filter: query.get("HOADocumentID").cloned(),
        apikey: header("apikey"),
        authorization: header("authorization"),
        body,
    });
    StatusCode::NO_CONTENT
}

async fn embedder(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.log("embed");
    StatusCode::from_u16(state.script.embedder_status).unwrap()
}

/// Start the orchestrator against `upstream` and return its base URL.
pub async fn spawn_app(upstream: &MockUpstream, policy: PollPolicy) -> String {
    let conversion =
        PdfCoClient::new(&format!("{}/v1", upstream.base_url), API_KEY).unwrap();
    let store = SupabaseDocumentStore::new(
        &upstream.base_url,
        SERVICE_KEY,
        "HOADocuments",
        "HOADocumentID",
    )
    .unwrap();
    let notifier = EmbedderNotifier::new(&format!("{}/embed", upstream.base_url)).unwrap();

    let state = AppState::new(
        Arc::new(conversion),
        Arc::new(store),
        Arc::new(notifier),
        policy,
    );
    let app = routes::router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base_url
}

/// Fast polling for tests: 20 ms between checks, 2 s budget.
pub fn fast_policy() -> PollPolicy {
    PollPolicy::new(Duration::from_millis(20), Duration::from_secs(2))
}

/// POST /extract-text with a raw JSON body.
pub async fn post_extract(
    client: &reqwest::Client,
    base_url: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/extract-text", base_url))
        .json(&body)
        .send()
        .await
        .expect("request to orchestrator failed")
}
