// SPDX-License-Identifier: MIT

//! Fleetpass API Server
//!
//! User-account microservice: registration, login, password management,
//! distance accounting, and token-based authentication.

use fleetpass::{
    config::Config,
    db::UserStore,
    services::{SessionCache, TokenService, UserService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Fleetpass API");

    // Connect to MySQL and make sure the schema exists
    let store = UserStore::connect(&config.database_url)
        .await
        .expect("Failed to connect to MySQL");
    store
        .ensure_schema()
        .await
        .expect("Failed to prepare schema");

    // Session cache and token signer, injected into the service layer
    let sessions = SessionCache::new();
    let tokens = TokenService::new(&config.jwt_signing_key);
    let users = UserService::new(store, sessions, tokens.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        tokens,
        users,
    });

    // Build router
    let app = fleetpass::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fleetpass=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
