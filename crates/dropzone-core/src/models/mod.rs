//! Data models
//!
//! Routing configuration, permission reports, upload lifecycle values and the
//! values exchanged with the hosting content repository.

mod content;
mod mapping;
mod permission;
mod upload;

// Re-export all models for convenient imports
pub use content::*;
pub use mapping::*;
pub use permission::*;
pub use upload::*;
