// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NoMercy Community API Server
//!
//! Serves the member API and the PWA front-end for the NoMercy gaming
//! community.

use nomercy_community::{
    config::Config, db::MemoryDb, services::IdentityVerifier, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting NoMercy Community API");

    // Process-lifetime store; contents are lost on restart.
    let db = MemoryDb::new();
    tracing::info!("In-memory store initialized");

    let identity_verifier = Arc::new(IdentityVerifier::new(&config)?);

    tracing::info!(
        static_dir = %config.static_dir.display(),
        exists = config.static_dir.exists(),
        "Static front-end directory"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity_verifier,
    });

    // Build router
    let app = nomercy_community::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nomercy_community=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
