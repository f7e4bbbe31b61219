use std::path::Path;

use super::{normalize, RawMappingConfig};
use crate::models::MappingConfiguration;
use crate::AppError;

/// Read an authored mapping file. `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn load_raw_config(path: impl AsRef<Path>) -> Result<RawMappingConfig, AppError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::InvalidConfig(format!(
            "Failed to read mapping configuration {}: {}",
            path.display(),
            e
        ))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        RawMappingConfig::from_json_str(&contents)
    } else {
        RawMappingConfig::from_yaml_str(&contents)
    }
}

/// Read and normalize a mapping file.
pub fn load_mapping_configuration(path: impl AsRef<Path>) -> Result<MappingConfiguration, AppError> {
    let path = path.as_ref();
    let config = normalize(&load_raw_config(path)?)?;

    tracing::info!(
        path = %path.display(),
        location_mappings = config.location_mappings().len(),
        default_mappings = config.default_mappings().len(),
        fallback_configured = config.fallback_content_type().is_configured(),
        max_file_size = config.max_file_size(),
        "Mapping configuration loaded"
    );

    Ok(config)
}
