//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{InMemoryUserDirectory, StaticCatalogAdapter, SystemClock},
    config::{Config, ConfigError},
    error::ApiError,
    seed::demo_library,
    web::{router, state::AppState, ApiDoc},
};
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use axum::Router;
use lending_ledger_core::Ledger;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(policy = ?config.policy, "Configuration loaded. Starting server...");

    // --- 2. Build the Ledger ---
    let (ledger, directory) = if config.seed_demo_data {
        demo_library(config.policy)?
    } else {
        warn!("SEED_DEMO_DATA is off; starting with an empty catalog and no members");
        (Ledger::new(config.policy), InMemoryUserDirectory::default())
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        ledger,
        directory,
        Arc::new(SystemClock),
        Arc::new(StaticCatalogAdapter::with_defaults()),
    ));

    // --- 4. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|_| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), config.cors_origin.clone())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
