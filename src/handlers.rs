use crate::{
    AppState,
    auth::{RequestCredential, Session},
    guard::{NavigationError, Navigator},
    models::{MenuResponse, NavigateQuery, NavigationResponse, RouteSummary},
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

// --- Handlers ---

/// get_routes
///
/// [Public Route] Serves the route table so the frontend router is built from the same
/// definition the guard evaluates.
#[utoipa::path(
    get,
    path = "/routes",
    responses((status = 200, description = "Route table", body = [RouteSummary]))
)]
pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(state.table.summaries())
}

/// navigate
///
/// [Public Route] Evaluates the guard for one navigation attempt.
///
/// The credential comes from the `Authorization` header or the `token` cookie. A missing or
/// malformed credential is never an error here; it yields `redirect_login` for protected paths.
#[utoipa::path(
    get,
    path = "/navigate",
    params(NavigateQuery),
    responses(
        (status = 200, description = "Guard decision", body = NavigationResponse),
        (status = 400, description = "Path is not absolute"),
        (status = 508, description = "Redirect entries loop")
    )
)]
pub async fn navigate(
    State(state): State<AppState>,
    credential: RequestCredential,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<NavigationResponse>, StatusCode> {
    let navigator = Navigator::new(state.table.clone(), credential)
        .with_max_redirects(state.config.max_redirects);

    match navigator.navigate(&query.path) {
        Ok(navigation) => {
            tracing::info!(
                requested = %navigation.requested,
                target = %navigation.target,
                outcome = ?navigation.outcome,
                "navigation evaluated"
            );
            Ok(Json(navigation.into()))
        }
        Err(e @ NavigationError::NotAbsolute(_)) => {
            tracing::debug!(error = %e, "rejecting navigation request");
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e @ NavigationError::TooManyRedirects { .. }) => {
            tracing::error!(error = %e, "route table redirects loop");
            Err(StatusCode::LOOP_DETECTED)
        }
    }
}

/// get_menu
///
/// [Authenticated Route] Returns the dashboard sidebar entries the caller's role may open.
#[utoipa::path(
    get,
    path = "/me/menu",
    responses(
        (status = 200, description = "Dashboard menu", body = MenuResponse),
        (status = 401, description = "No usable credential")
    )
)]
pub async fn get_menu(
    Session { claims }: Session,
    State(state): State<AppState>,
) -> Json<MenuResponse> {
    let items = state.table.dashboard_menu(claims.role);
    Json(MenuResponse { role: claims.role, name: claims.name, items })
}
