use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation core: route table, credentials, guard.
pub mod auth;
pub mod guard;
pub mod models;
pub mod route_table;

// HTTP service around the core.
pub mod config;
pub mod handlers;
pub mod routes;
use auth::Session;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::{CredentialProvider, MemoryCredentialStore, decode_credential};
pub use config::AppConfig;
pub use guard::{GuardTarget, Navigation, Navigator, evaluate};
pub use models::{GuardOutcome, Role, RouteMeta, View};
pub use route_table::RouteTable;

/// ApiDoc
///
/// OpenAPI document for the navigation service, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::get_routes, handlers::navigate, handlers::get_menu),
    components(
        schemas(
            models::Role, models::View, models::RouteMeta, models::GuardOutcome,
            models::RouteSummary, models::NavigationResponse, models::MenuItem,
            models::MenuResponse,
        )
    ),
    tags(
        (name = "campus-nav", description = "Dashboard navigation guard API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state: the validated route table and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub config: AppConfig,
}

impl FromRef<AppState> for Arc<RouteTable> {
    fn from_ref(app_state: &AppState) -> Arc<RouteTable> {
        app_state.table.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Rejects requests without a decodable credential before they reach an authenticated
/// handler. The rejection comes from the `Session` extractor (401).
async fn session_middleware(_session: Session, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, the session layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), session_middleware)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for each HTTP request, correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
