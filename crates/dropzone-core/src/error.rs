//! Error types module
//!
//! This module provides the error types used throughout Dropzone. Domain failures
//! are unified under [`AppError`]; failures reported by the hosting content
//! repository are described by [`HostError`] and wrapped by the variant that
//! matches the step that failed.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like host hiccups
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UNRESOLVED_MIME_TYPE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure reported by the hosting content repository.
///
/// The three transport-facing shapes are kept apart because each one is
/// rendered with its own user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host answered with an HTTP-like status. `None` when no status was available.
    #[error("host responded with status {}: {}", display_status(.code), .text.as_deref().unwrap_or("no status text"))]
    Status { code: Option<u16>, text: Option<String> },

    /// The request never produced a response (connection reset, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The host answered with an error document.
    #[error("{error_code}: {description}")]
    Domain {
        error_code: String,
        description: String,
    },

    #[error("not found: {0}")]
    NotFound(String),
}

fn display_status(code: &Option<u16>) -> String {
    match code {
        Some(code) if *code > 0 => code.to_string(),
        _ => "N/A".to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid mapping configuration: {0}")]
    InvalidConfig(String),

    #[error("No mapping for MIME type '{mime_type}' in container '{container}' and no fallback content type configured")]
    UnresolvedMimeType { container: String, mime_type: String },

    #[error("File type '{mime_type}' of '{file_name}' is not allowed in container '{container}'")]
    TypeNotAllowed {
        file_name: String,
        mime_type: String,
        container: String,
    },

    #[error("File '{file_name}' is {size} bytes, exceeding the limit of {max} bytes")]
    SizeExceeded {
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("Permission check for content type '{content_type}' failed")]
    PermissionCheckFailed {
        content_type: String,
        #[source]
        source: HostError,
    },

    #[error("Upload of '{file_name}' failed")]
    UploadTransportFailed {
        file_name: String,
        #[source]
        source: HostError,
    },

    #[error("Content {content_id} was created but could not be published")]
    PublishFailed {
        content_id: u64,
        file_name: String,
        #[source]
        source: HostError,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidConfig(format!("JSON parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::InvalidConfig(format!("YAML parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidConfig(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidConfig(_) => (
            500,
            "INVALID_CONFIG",
            false,
            Some("Fix the mapping configuration and restart"),
            false,
            LogLevel::Error,
        ),
        AppError::UnresolvedMimeType { .. } => (
            422,
            "UNRESOLVED_MIME_TYPE",
            false,
            Some("Upload a file type that is mapped for this location"),
            false,
            LogLevel::Debug,
        ),
        AppError::TypeNotAllowed { .. } => (
            415,
            "TYPE_NOT_ALLOWED",
            false,
            Some("Upload a file type accepted by this location"),
            false,
            LogLevel::Debug,
        ),
        AppError::SizeExceeded { .. } => (
            413,
            "SIZE_EXCEEDED",
            false,
            Some("Reduce file size below the configured limit"),
            false,
            LogLevel::Debug,
        ),
        AppError::PermissionCheckFailed { .. } => (
            502,
            "PERMISSION_CHECK_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::UploadTransportFailed { .. } => (
            502,
            "UPLOAD_TRANSPORT_FAILED",
            true,
            Some("Retry the upload"),
            false,
            LogLevel::Warn,
        ),
        AppError::PublishFailed { .. } => (
            502,
            "PUBLISH_FAILED",
            true,
            Some("Publish the created draft from the content view"),
            false,
            LogLevel::Warn,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidConfig(_) => "InvalidConfig",
            AppError::UnresolvedMimeType { .. } => "UnresolvedMimeType",
            AppError::TypeNotAllowed { .. } => "TypeNotAllowed",
            AppError::SizeExceeded { .. } => "SizeExceeded",
            AppError::PermissionCheckFailed { .. } => "PermissionCheckFailed",
            AppError::UploadTransportFailed { .. } => "UploadTransportFailed",
            AppError::PublishFailed { .. } => "PublishFailed",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidConfig(_) => "Upload configuration is invalid".to_string(),
            AppError::UnresolvedMimeType { mime_type, .. } => {
                format!("Cannot route files of type '{}' to any content type", mime_type)
            }
            AppError::TypeNotAllowed { file_name, .. } => {
                format!("File type of '{}' is not allowed here", file_name)
            }
            AppError::SizeExceeded { file_name, max, .. } => format!(
                "'{}' exceeds the maximum file size of {}",
                file_name,
                crate::format::format_file_size(*max)
            ),
            AppError::PermissionCheckFailed { .. } => {
                "Failed to check content create permissions".to_string()
            }
            AppError::UploadTransportFailed { file_name, source } => {
                crate::format::upload_failure_text(file_name, source)
            }
            AppError::PublishFailed {
                file_name, source, ..
            } => crate::format::upload_failure_text(file_name, source),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
