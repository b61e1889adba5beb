//! Web front end for the student matching assistant.
//!
//! # Endpoints
//!
//! - `GET /` - Single page with a button that triggers a run
//! - `POST /run` - Run the pipeline, respond `{"output": ...}` (200 or 400)
//! - `GET /health` - Health check
//!
//! ```text
//! Browser
//!    │  POST /run
//!    ▼
//! ┌─────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   API (Axum)    │ ──► │ Roster (CSV) │ ──► │ Collaborator │
//! └─────────────────┘     └──────────────┘     │    (LLM)     │
//!                                              └──────────────┘
//! ```

pub mod config;
pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use state::AppState;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::index))
        .route("/run", post(routes::run))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given address.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Starting Matchmate server");

    axum::serve(listener, router).await?;

    Ok(())
}
