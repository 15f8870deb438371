//! HTTP trigger service for the anomaly detector
//!
//! Exposes a token-guarded endpoint that executes one detector run and
//! returns its captured output, plus a health probe. The run happens
//! in-process; the response mirrors a process invocation (exit code,
//! stdout, stderr) so callers can script against it.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::detector::{DetectorConfig, DetectorEngine, WebhookSink};

/// Fallback trigger token when OPS_AGENT_TOKEN is unset
pub const DEFAULT_OPS_TOKEN: &str = "kiren-ops-123";

/// Captured output is clipped to this many trailing characters per stream
const MAX_CAPTURE_CHARS: usize = 4000;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub token: String,
    pub run_timeout: Duration,
}

/// Create the trigger-service router
pub fn create_router(token: String, run_timeout: Duration) -> Router {
    let state = AppState { token, run_timeout };

    Router::new()
        .route("/health", get(health_check))
        .route("/run", post(trigger_run))
        .with_state(state)
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Execute one detector run, guarded by the X-OPS-TOKEN header
async fn trigger_run(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RunResponse>, ApiError> {
    let provided = headers
        .get("X-OPS-TOKEN")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided != state.token {
        return Err(ApiError::Unauthorized);
    }

    match tokio::time::timeout(state.run_timeout, run_detector_once()).await {
        Ok(response) => Ok(Json(response)),
        Err(_) => Err(ApiError::Timeout),
    }
}

/// Run the detector with environment-derived configuration
///
/// Configuration is re-read on every run so operators can adjust paths or
/// thresholds between triggers without restarting the service.
async fn run_detector_once() -> RunResponse {
    let config = match DetectorConfig::from_env() {
        Ok(config) => config,
        Err(e) => return RunResponse::failure(e.to_string()),
    };

    let sink = match WebhookSink::new(config.webhook_url.clone(), config.webhook_timeout) {
        Ok(sink) => sink,
        Err(e) => return RunResponse::failure(e.to_string()),
    };

    run_with_config(DetectorEngine::new(config, Box::new(sink))).await
}

/// Run one evaluation on an already-built engine and capture its output
pub async fn run_with_config(engine: DetectorEngine) -> RunResponse {
    match engine.run_once().await {
        Ok(report) => {
            let mut stdout = serde_json::to_string_pretty(&report.payload).unwrap_or_default();
            if let Some(e) = &report.delivery_error {
                stdout.push_str(&format!("\nWARN: {}", e));
            }
            RunResponse {
                exit_code: 0,
                stdout: tail_chars(&stdout, MAX_CAPTURE_CHARS),
                stderr: String::new(),
            }
        }
        Err(e) => RunResponse::failure(e.to_string()),
    }
}

// ===== Request/Response Types =====

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
}

/// Process-style result of one triggered run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunResponse {
    fn failure(message: String) -> Self {
        Self {
            exit_code: 1,
            stdout: String::new(),
            stderr: tail_chars(&message, MAX_CAPTURE_CHARS),
        }
    }
}

/// Keep only the last `max` characters of a captured stream
fn tail_chars(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        s.chars().skip(count - max).collect()
    }
}

// ===== Error Handling =====

#[derive(Debug)]
enum ApiError {
    Unauthorized,
    Timeout,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Timeout => {
                log::error!("❌ Detector run exceeded the service timeout");
                (StatusCode::INTERNAL_SERVER_ERROR, "runner timed out")
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
