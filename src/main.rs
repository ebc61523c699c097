// SPDX-License-Identifier: MIT

//! MissionSend API Server
//!
//! Backend for the MissionSend donor/fundraising platform: profiles with
//! emergency lock, verification gating, trips, donations, prayer requests,
//! and notifications.

use dashmap::DashMap;
use missionsend_api::{
    config::Config,
    db::FirestoreDb,
    services::{IdentityService, Notifier},
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
    tracing::info!(port = config.port, "Starting MissionSend API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Verification lookups are cached with a short TTL and shared across
    // all requests within this instance.
    let verification_cache = Arc::new(DashMap::new());

    let identity = Arc::new(
        IdentityService::new(&config, verification_cache)
            .expect("Failed to initialize identity provider client"),
    );
    tracing::info!(provider = %config.identity_api_url, "Identity provider client initialized");

    let notifier = Notifier::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        notifier,
    });

    // Build router
    let app = missionsend_api::routes::create_router(state);

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
                .add_directive("missionsend_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
