mod orchestrator;

pub use orchestrator::{UploadOrchestrator, UploadTarget};
