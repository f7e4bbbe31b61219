//! Host adapter setup

use anyhow::{Context, Result};
use dropzone_core::Config;
use dropzone_services::InMemoryHost;

/// In-memory host, seeded from `HOST_FIXTURE_PATH` when set.
pub fn setup_host(config: &Config) -> Result<InMemoryHost> {
    match config.host_fixture_path() {
        Some(path) => {
            let host = InMemoryHost::from_path(path).with_context(|| {
                format!("Failed to load host fixture from {}", path.display())
            })?;
            tracing::info!(path = %path.display(), "In-memory host seeded from fixture");
            Ok(host)
        }
        None => {
            tracing::warn!("HOST_FIXTURE_PATH not set - starting with an empty in-memory host");
            Ok(InMemoryHost::new())
        }
    }
}
