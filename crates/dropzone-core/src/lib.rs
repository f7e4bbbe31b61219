//! Dropzone Core Library
//!
//! This crate provides the upload routing model shared by every Dropzone
//! component: the mapping configuration and its normalizer, the MIME type
//! resolver, error types, process configuration and the contracts of the
//! hosting content repository.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod mapping;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use config::{BaseConfig, Config, LogFormat};
pub use error::{AppError, ErrorMetadata, HostError, LogLevel};
pub use format::{format_file_size, upload_failure_text};
pub use mapping::{
    candidate_content_types, load_mapping_configuration, normalize, resolve_mapping,
    RawMappingConfig,
};
pub use repository::{ContentRepository, ContentTypeLookup, LocationLookup, PermissionOracle};
