//! HTTP route handlers for the API.

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Body of every `POST /run` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub output: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub model: String,
}

/// Serve the single-page UI.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Run the matching pipeline once against the configured roster.
pub async fn run(State(state): State<Arc<AppState>>) -> (StatusCode, Json<RunResponse>) {
    info!(roster = %state.roster_path.display(), "Matching run requested");

    let result = state.pipeline.run(&state.roster_path).await;
    let status = if result.is_success() {
        StatusCode::OK
    } else {
        warn!(kind = ?result.failure_kind(), "Matching run failed");
        StatusCode::BAD_REQUEST
    };

    (
        status,
        Json(RunResponse {
            output: result.output(),
        }),
    )
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        model: state.pipeline.model_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_response_has_single_output_field() {
        let json = serde_json::to_value(RunResponse {
            output: "- A and B: ...".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"output": "- A and B: ..."}));
    }

    #[test]
    fn index_page_posts_to_run() {
        assert!(INDEX_HTML.contains("Run Matching Agent"));
        assert!(INDEX_HTML.contains("fetch('/run', { method: 'POST' })"));
    }
}
