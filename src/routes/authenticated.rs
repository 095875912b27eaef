use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes that require a present, decodable credential. Every handler here takes the
/// `Session` extractor, and the router is additionally wrapped by the session middleware.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me/menu
        // The dashboard sidebar filtered by the caller's role.
        .route("/me/menu", get(handlers::get_menu))
}
