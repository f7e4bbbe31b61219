//! Application setup and initialization
//!
//! Everything `main` needs to go from a [`Config`] to a served router.

pub mod host;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use dropzone_core::{load_mapping_configuration, Config};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    dropzone_infra::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    // Any normalization error aborts startup
    let mapping = load_mapping_configuration(config.mapping_config_path())
        .context("Failed to load mapping configuration")?;

    let host = host::setup_host(&config)?;

    let state = Arc::new(AppState::with_host(config.clone(), mapping, host));

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
