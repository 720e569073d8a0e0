//! # tally-api: HTTP Layer for Tally
//!
//! JSON API over the Tally ledger. Handlers extract, call one repository
//! operation, and map failures to [`ApiError`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Request Lifecycle                                │
//! │                                                                         │
//! │  HTTP request                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TraceLayer ──► DefaultBodyLimit ──► Extension(Arc<AppState>)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  /api router (routes/*.rs)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tally-db repository ──► Ok(Json) or ApiError { code, message, errors } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, SharedState};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

/// Builds the full application router with its layers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .nest("/api", routes::api_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
