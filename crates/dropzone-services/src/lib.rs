//! Dropzone Services Layer
//!
//! Business services on top of `dropzone-core`: the permission report service,
//! the upload orchestrator and the in-memory host adapter. Keep coordination
//! here; keep thin HTTP handling in dropzone-api.

pub mod host;
pub mod permission;
pub mod upload;

pub use host::InMemoryHost;
pub use permission::PermissionReportService;
pub use upload::{UploadOrchestrator, UploadTarget};
