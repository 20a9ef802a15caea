//! Core library for Candor.  This module wires together the analysis
//! pipeline (validate → prompt → complete → parse), request/response
//! structures and HTTP handlers.
//!
//! The service is stateless by design: each request is validated, sent to
//! the completion provider once, shape-checked and returned.  No analysis
//! content is stored, cached or logged, which is the privacy guarantee the
//! whole design leans on.  The one externally-observable side effect is
//! the outbound completion call: the submitted text leaves the process
//! boundary and is handed to a third-party LLM provider.

mod config;
pub mod completion;
pub mod error;
pub mod prompt;
pub mod schema;
pub mod validate;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{
    rejection::{BytesRejection, FailedToBufferBody, JsonRejection},
    DefaultBodyLimit, State,
};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::completion::CompletionClient;
use crate::error::AnalysisError;
use crate::schema::AnalysisResult;
use crate::validate::FieldIssue;

/// A validated analyze request.  Created per call, never persisted, and
/// discarded once the response has been written.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// Envelope for a completed analysis.
#[derive(Debug, Serialize)]
struct SuccessEnvelope {
    success: bool,
    data: AnalysisResult,
}

/// Envelope for every failure outcome.  `details` carries the structured
/// validation issues and is present only for input-validation failures.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
}

/// Internal application state shared across handlers.  Holds the single
/// completion client (constructed once with the injected credential) and
/// the request body cap.
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<CompletionClient>,
    /// Maximum accepted raw request body size in bytes (None => axum default)
    pub max_request_bytes: Option<usize>,
}

/// Build state from an already-parsed configuration.  Tests construct the
/// config directly with a stub provider URL instead of going through the
/// environment.
pub fn build_state(config: AppConfig) -> AppState {
    let client = CompletionClient::new(
        config.api_key,
        config.base_url,
        Duration::from_millis(config.completion_timeout_ms),
    );
    AppState {
        completion: Arc::new(client),
        max_request_bytes: config.max_request_bytes,
    }
}

/// Build state from environment variables (see [`AppConfig::from_env`]).
pub fn build_state_from_env() -> anyhow::Result<AppState> {
    Ok(build_state(AppConfig::from_env()?))
}

/// Build the Axum router and attach handlers.  The router holds a copy
/// of the `AppState` for each invocation.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/health", get(health_handler));

    let router = if let Some(limit) = state.max_request_bytes {
        router.layer(DefaultBodyLimit::max(limit))
    } else {
        router
    };

    router.with_state(state)
}

fn respond_with_error(err: &AnalysisError) -> axum::response::Response {
    let envelope = ErrorEnvelope {
        success: false,
        error: err.to_string(),
        details: match err {
            AnalysisError::Input(issues) => Some(issues.clone()),
            _ => None,
        },
    };
    (err.http_status(), Json(envelope)).into_response()
}

/// Handler for `POST /api/analyze`.  Single linear attempt per request:
/// validate, build the prompt, make exactly one completion call, validate
/// the response shape, wrap in the envelope.  Failures at any stage are
/// mapped to the error envelope; retry policy belongs to the caller.
async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> axum::response::Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return handle_json_rejection(state.max_request_bytes, rejection);
        }
    };

    let request = match validate::validate_body(&body) {
        Ok(request) => request,
        Err(issues) => {
            tracing::debug!(issue_count = issues.len(), "request body failed validation");
            return respond_with_error(&AnalysisError::Input(issues));
        }
    };

    let start = Instant::now();
    match run_analysis(&state, &request.text).await {
        Ok(result) => {
            tracing::info!(
                latency_ms = start.elapsed().as_millis() as u64,
                tactic_count = result.tactics_detected.len(),
                overall_risk = ?result.overall_risk,
                "analysis complete"
            );
            (
                StatusCode::OK,
                Json(SuccessEnvelope {
                    success: true,
                    data: result,
                }),
            )
                .into_response()
        }
        Err(err) => {
            // Log stage and kind only; the submitted text stays out of the logs.
            tracing::warn!(
                stage = err.stage(),
                kind = err.kind(),
                latency_ms = start.elapsed().as_millis() as u64,
                "analysis failed"
            );
            respond_with_error(&err)
        }
    }
}

/// The validate → prompt → complete → parse pipeline.  Exactly one
/// outbound call; if the caller disconnects, dropping this future aborts
/// the in-flight provider request.
async fn run_analysis(state: &AppState, text: &str) -> Result<AnalysisResult, AnalysisError> {
    let prompt = prompt::build_prompt(text);
    let raw = state.completion.complete(&prompt).await?;
    let result = schema::parse_result(&raw)?;
    Ok(result)
}

fn handle_json_rejection(
    max_request_bytes: Option<usize>,
    rejection: JsonRejection,
) -> axum::response::Response {
    match rejection {
        JsonRejection::BytesRejection(BytesRejection::FailedToBufferBody(
            FailedToBufferBody::LengthLimitError(_),
        )) => {
            if let Some(limit) = max_request_bytes {
                tracing::warn!(limit, "request body exceeded configured limit");
            } else {
                tracing::warn!("request body exceeded limit but no max_request_bytes configured");
            }
            let envelope = ErrorEnvelope {
                success: false,
                error: "Request too large".to_string(),
                details: None,
            };
            (StatusCode::PAYLOAD_TOO_LARGE, Json(envelope)).into_response()
        }
        other => {
            let envelope = ErrorEnvelope {
                success: false,
                error: "Invalid input".to_string(),
                details: Some(vec![FieldIssue {
                    path: "body".to_string(),
                    message: other.body_text(),
                }]),
            };
            (StatusCode::BAD_REQUEST, Json(envelope)).into_response()
        }
    }
}

/// Liveness endpoint: always 200, no dependency checks.  A missing
/// provider credential must not fail this route.
async fn health_handler() -> axum::response::Response {
    let json = serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    (StatusCode::OK, Json(json)).into_response()
}
