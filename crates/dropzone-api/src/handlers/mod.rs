pub mod client_config;
pub mod content_delete;
pub mod permission_report;
pub mod upload;
