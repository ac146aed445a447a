//! API routes
//!
//! JSON/redirect endpoints under `/api`, plus the metrics endpoint.

mod github;
mod metrics;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use metrics::metrics_router;

/// Create API router (nested under `/api`)
///
/// Routes:
/// - GET /auth/callback - OAuth callback from the auth provider
/// - POST /auth/github/disconnect - Clear the GitHub connection
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/callback", get(github::callback))
        .route(
            "/auth/github/disconnect",
            post(github::disconnect)
                .get(github::method_not_allowed)
                .put(github::method_not_allowed)
                .delete(github::method_not_allowed),
        )
}
