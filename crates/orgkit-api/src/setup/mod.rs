//! Application setup and initialization
//!
//! All application initialization logic lives here rather than in main.rs so
//! integration tests can build the same app against their own database.

pub mod database;
pub mod routes;
pub mod server;

use crate::services::email::EmailService;
use crate::state::{AppState, DbState};
use anyhow::{Context, Result};
use orgkit_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(&config.environment);
    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    let email = EmailService::from_config(&config);
    if email.is_none() {
        tracing::info!("Email disabled; invitation links must be shared out of band");
    }

    let state = Arc::new(AppState {
        db: DbState::new(pool),
        is_production: config.is_production(),
        email,
        config: config.clone(),
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
