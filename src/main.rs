use campus_nav::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    route_table::RouteTable,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, validates the route table and serves the
/// navigation API.
#[tokio::main]
async fn main() {
    // 1. Configuration
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus_nav=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Navigation service starting in {:?} mode", config.env);

    // 3. Route table (fail-fast on a broken definition)
    let table = RouteTable::canonical();
    table
        .validate()
        .expect("FATAL: Route table failed validation.");
    tracing::info!(routes = table.routes().len(), "route table loaded");

    // 4. Router and server startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { table: Arc::new(table), config });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
