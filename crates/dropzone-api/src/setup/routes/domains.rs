//! Domain route groups (configuration, permissions, uploads).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use dropzone_infra::xhr_guard_middleware;
use std::sync::Arc;

pub fn config_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/config", API_PREFIX),
            get(handlers::client_config::get_client_config),
        )
        .route(
            &format!("{}/config/containers/{{container}}", API_PREFIX),
            get(handlers::client_config::get_container_config),
        )
}

/// Permission reports are only answered for programmatic callers.
pub fn permission_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/permission-report/{{parent_location_id}}", API_PREFIX),
            get(handlers::permission_report::get_permission_report),
        )
        .route(
            &format!(
                "{}/check-permission/{{parent_location_id}}/{{content_type_id}}",
                API_PREFIX
            ),
            get(handlers::permission_report::check_permission),
        )
        .route_layer(axum::middleware::from_fn(xhr_guard_middleware))
}

pub fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/locations/{{parent_location_id}}/uploads", API_PREFIX),
            post(handlers::upload::upload_files),
        )
        .route(
            &format!("{}/contents/{{content_id}}", API_PREFIX),
            delete(handlers::content_delete::delete_content),
        )
}
