//! HTTP front end for topic extraction.
//!
//! Two multipart endpoints:
//! - `POST /extract-topics` (`description`, `file`) → JSON topic list
//! - `POST /json-to-amsl` (`file`) → AMSL YAML

use std::sync::Arc;

use axum::Router;
use axum::routing::post;

pub mod error;
pub mod handlers;
pub mod state;
pub mod upload;

pub use error::ApiError;
pub use state::AppState;

/// Uploads larger than this are rejected before reaching a handler.
pub const BODY_LIMIT: usize = 100 * 1024 * 1024;

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/extract-topics", post(handlers::extract::extract_topics))
        .route("/json-to-amsl", post(handlers::amsl::json_to_amsl))
        .layer(axum::extract::DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
