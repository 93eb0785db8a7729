//! Health check endpoint for container orchestration.
//!
//! The hosting platform probes this route to decide container liveness.
//! It reports the process's own readiness only: the upstream openFDA API is
//! deliberately not probed here, since an upstream outage should surface as
//! 502s on label routes rather than a restart loop.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check handler.
///
/// Returns 200 while the process is ready to serve and 503 once a shutdown
/// drain has begun. Side-effect free, so probes can repeat at any rate.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.readiness.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}
