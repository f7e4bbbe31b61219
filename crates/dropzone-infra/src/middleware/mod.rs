//! Shared HTTP middleware for Dropzone services

pub mod request_id;
pub mod xhr_guard;

pub use request_id::{get_request_id, request_id_middleware, RequestId};
pub use xhr_guard::xhr_guard_middleware;
