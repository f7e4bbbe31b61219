//! Operator commands over a mapping configuration file.
//!
//! Every command loads and normalizes the file first, so an invalid file
//! fails every command. Output goes to stdout; logs go to stderr.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dropzone_core::format_file_size;
use dropzone_core::mapping::{
    candidate_content_types, file_picker_filter, load_mapping_configuration, resolve_mapping,
};
use dropzone_core::models::{MappingConfiguration, ResolvedMapping};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "dropzone", about = "Dropzone mapping configuration tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and normalize a mapping file, printing a summary
    Validate {
        /// Mapping file (YAML, or JSON with a .json extension)
        file: PathBuf,
    },
    /// Resolve the target content type for a MIME type in a container
    Resolve {
        file: PathBuf,
        /// Content type identifier of the container
        #[arg(long)]
        container: String,
        /// MIME type of the dropped file
        #[arg(long)]
        mime: String,
    },
    /// List every content type a container could hold
    Candidates {
        file: PathBuf,
        #[arg(long)]
        container: String,
    },
    /// Print the configuration as served to the drop zone front end
    ClientConfig { file: PathBuf },
    /// Print the normalized configuration in the authored (snake_case) YAML form
    Normalize { file: PathBuf },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub location_mappings: usize,
    pub default_mappings: usize,
    pub fallback_configured: bool,
    pub max_file_size: u64,
    pub max_file_size_text: String,
}

impl ValidationSummary {
    pub fn of(config: &MappingConfiguration) -> Self {
        Self {
            location_mappings: config.location_mappings().len(),
            default_mappings: config.default_mappings().len(),
            fallback_configured: config.fallback_content_type().is_configured(),
            max_file_size: config.max_file_size(),
            max_file_size_text: format_file_size(config.max_file_size()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesReport {
    pub container: String,
    pub candidate_content_types: BTreeSet<String>,
    pub mime_type_filter: Vec<String>,
}

/// Resolution result; errors (including an unresolved MIME type) are
/// returned rather than printed so the process exits non-zero.
pub fn resolve(config: &MappingConfiguration, container: &str, mime: &str) -> anyhow::Result<ResolvedMapping> {
    Ok(resolve_mapping(config, container, mime)?)
}

pub fn candidates(config: &MappingConfiguration, container: &str) -> CandidatesReport {
    CandidatesReport {
        container: container.to_string(),
        candidate_content_types: candidate_content_types(config, container),
        mime_type_filter: file_picker_filter(config, container).to_vec(),
    }
}

fn load(file: &Path) -> anyhow::Result<MappingConfiguration> {
    load_mapping_configuration(file)
        .with_context(|| format!("Invalid mapping configuration {}", file.display()))
}

fn to_json(value: &impl Serialize) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Serialize output")
}

/// Run one command and return what should be printed.
pub fn run(command: &Commands) -> anyhow::Result<String> {
    match command {
        Commands::Validate { file } => to_json(&ValidationSummary::of(&load(file)?)),
        Commands::Resolve {
            file,
            container,
            mime,
        } => to_json(&resolve(&load(file)?, container, mime)?),
        Commands::Candidates { file, container } => to_json(&candidates(&load(file)?, container)),
        Commands::ClientConfig { file } => to_json(&load(file)?),
        Commands::Normalize { file } => {
            serde_yaml::to_string(&load(file)?.to_raw()).context("Serialize output")
        }
    }
}

/// Initialize tracing for the CLI. Logs go to stderr.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropzone_core::{AppError, RawMappingConfig};
    use std::io::Write;

    const MAPPINGS: &str = r#"
location_mappings:
  - content_type_identifier: gallery
    mime_type_filter: ["image/*"]
    mappings:
      - mime_type: image/png
        content_type_identifier: image
        content_field_identifier: image
default_mappings:
  - mime_types: [application/pdf]
    content_type_identifier: file
    content_field_identifier: file
"#;

    fn mapping_file(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_prints_summary() {
        let file = mapping_file(MAPPINGS, ".yaml");
        let output = run(&Commands::Validate {
            file: file.path().to_path_buf(),
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["locationMappings"], 1);
        assert_eq!(json["defaultMappings"], 1);
        assert_eq!(json["fallbackConfigured"], false);
        assert_eq!(json["maxFileSize"], 64_000_000);
        assert_eq!(json["maxFileSizeText"], "61.0 MB");
    }

    #[test]
    fn test_validate_rejects_invalid_file() {
        let file = mapping_file("default_mappings:\n  - content_type_identifier: file\n    content_field_identifier: file\n", ".yaml");
        let err = run(&Commands::Validate {
            file: file.path().to_path_buf(),
        })
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_resolve_location_then_default() {
        let file = mapping_file(MAPPINGS, ".yaml");
        let output = run(&Commands::Resolve {
            file: file.path().to_path_buf(),
            container: "gallery".to_string(),
            mime: "application/pdf".to_string(),
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["contentTypeIdentifier"], "file");
        assert_eq!(json["source"], "default");
        assert_eq!(json["nameFieldIdentifier"], "name");
    }

    #[test]
    fn test_resolve_unmapped_without_fallback_fails() {
        let file = mapping_file(MAPPINGS, ".yaml");
        let err = run(&Commands::Resolve {
            file: file.path().to_path_buf(),
            container: "folder".to_string(),
            mime: "text/plain".to_string(),
        })
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::UnresolvedMimeType { .. })
        ));
    }

    #[test]
    fn test_candidates_for_location_mapping() {
        let file = mapping_file(MAPPINGS, ".yaml");
        let output = run(&Commands::Candidates {
            file: file.path().to_path_buf(),
            container: "gallery".to_string(),
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["candidateContentTypes"], serde_json::json!(["image"]));
        assert_eq!(json["mimeTypeFilter"], serde_json::json!(["image/*"]));
    }

    #[test]
    fn test_client_config_from_json_file() {
        let json_config = r#"{"default_mappings": [{"mime_type": "image/png", "content_type_identifier": "image", "content_field_identifier": "image"}], "max_file_size": 1024}"#;
        let file = mapping_file(json_config, ".json");
        let output = run(&Commands::ClientConfig {
            file: file.path().to_path_buf(),
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["defaultMappings"][0]["mimeTypes"], serde_json::json!(["image/png"]));
        assert_eq!(json["maxFileSize"], 1024);
    }

    #[test]
    fn test_normalize_output_is_a_fixed_point() {
        let file = mapping_file(MAPPINGS, ".yaml");
        let output = run(&Commands::Normalize {
            file: file.path().to_path_buf(),
        })
        .unwrap();

        let reparsed = RawMappingConfig::from_yaml_str(&output).unwrap();
        let renormalized = dropzone_core::normalize(&reparsed).unwrap();
        assert_eq!(renormalized.to_raw(), reparsed);
    }
}
