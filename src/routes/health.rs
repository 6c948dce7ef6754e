use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub poll_policy: PollPolicyInfo,
}

#[derive(Serialize)]
pub struct PollPolicyInfo {
    pub interval_secs: u64,
    pub max_wait_secs: u64,
    pub max_status_checks: u64,
}

/// GET /health — service status and the effective polling budget.
///
/// External services are not probed: every PDF.co call may be billable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let policy = state.submitter.tracker().policy();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        poll_policy: PollPolicyInfo {
            interval_secs: policy.interval.as_secs(),
            max_wait_secs: policy.max_wait.as_secs(),
            max_status_checks: policy.max_checks(),
        },
    })
}
