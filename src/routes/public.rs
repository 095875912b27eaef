use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a credential. `/navigate` still reads one when it is sent,
/// since the guard's answer depends on it.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /routes
        // The route table in wire form.
        .route("/routes", get(handlers::get_routes))
        // GET /navigate?path=...
        // Guard decision for one navigation attempt.
        .route("/navigate", get(handlers::navigate))
}
