//! Dropzone API Library
//!
//! This crate provides the HTTP handlers, application state and setup of the
//! drop zone service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;

pub mod error;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
