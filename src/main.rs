// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_session::spawn_session;
use crate::application::listing_service::ListingService;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::platform_client::{HttpPlatformClient, SessionContext};
use crate::presentation::app_state::AppState;
use crate::presentation::routes::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_dashboard_config()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    // Create platform client (infrastructure layer)
    let session_context = SessionContext::new(config.api.base_url, config.api.token);
    tracing::info!("Using publication platform at {}", session_context.base_url());
    let client = Arc::new(HttpPlatformClient::new(
        session_context,
        Duration::from_secs(config.api.timeout_secs),
    )?);

    // Create services (application layer)
    let session = spawn_session(client.clone(), config.dashboard.session_settings());
    let listings = ListingService::new(
        client,
        config.dashboard.publications_page_len,
        config.dashboard.users_page_len,
    );

    // Create application state
    let state = Arc::new(AppState {
        session,
        listings,
        activity_page_len: config.dashboard.activity_page_len,
    });

    // Build router (presentation layer)
    let router = create_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.server.listen_addr))?;
    tracing::info!("Starting publication-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
