use axum::Router;
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        store = %config.store,
        "Starting users API"
    );

    let db = match config.database.clone() {
        Some(database) => Some(
            database::postgres::connect_from_config_with_retry(database, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?,
        ),
        None => None,
    };

    let state = AppState { config, db };
    let app = build_app(&state)?;

    info!("Starting users API with production-ready shutdown (30s timeout)");

    // State moves here for cleanup
    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        if let Some(db) = state.db {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}

/// API routes plus docs, middleware, `/health` and `/ready`
fn build_app(state: &AppState) -> eyre::Result<Router> {
    let api_routes = api::routes(state);

    let router = create_router::<openapi::ApiDoc>(
        api_routes,
        &state.config.server.cors_allowed_origins,
    )?;

    Ok(router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone())))
}
