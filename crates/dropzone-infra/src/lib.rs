//! Dropzone Infrastructure Library
//!
//! Shared infrastructure for Dropzone services:
//! - Middleware (request ID, XHR guard)
//! - Tracing initialization
//! - The JSON error body returned by the HTTP surface

pub mod error;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use error::ErrorResponse;
pub use middleware::{get_request_id, request_id_middleware, xhr_guard_middleware, RequestId};
pub use telemetry::init_telemetry;
