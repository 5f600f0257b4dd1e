//! User identity API server

use std::sync::Arc;
use user_api::{create_router, state::AppState};
use user_core::{AppConfig, PgIdentityStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "user_api=debug,tower_http=debug".into());
    if config.logging.json_format {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Connect the identity store and make sure the schema is in place
    let store = PgIdentityStore::connect(&config.database).await?;
    store.ensure_schema().await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state and router
    let state = Arc::new(AppState::new(config, Arc::new(store)));
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("user service listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
