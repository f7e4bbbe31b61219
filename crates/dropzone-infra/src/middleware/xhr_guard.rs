//! Programmatic-caller guard
//!
//! Permission reports are only served to scripted callers that send
//! `X-Requested-With: XMLHttpRequest`.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dropzone_core::constants::XML_HTTP_REQUEST;

use crate::error::ErrorResponse;

pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

pub fn is_xhr_request(request: &Request) -> bool {
    request
        .headers()
        .get(REQUESTED_WITH_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case(XML_HTTP_REQUEST))
        .unwrap_or(false)
}

/// Rejects requests without `X-Requested-With: XMLHttpRequest` with a 400.
pub async fn xhr_guard_middleware(request: Request, next: Next) -> Response {
    if !is_xhr_request(&request) {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected non-XHR request"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::new("The request is not an AJAX request", "NOT_AJAX_REQUEST")
                    .with_error_type("BadRequest")
                    .with_suggested_action("Send the X-Requested-With: XMLHttpRequest header"),
            ),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/guarded", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(xhr_guard_middleware))
    }

    #[tokio::test]
    async fn test_xhr_request_passes() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/guarded")
                    .header(REQUESTED_WITH_HEADER, "XMLHttpRequest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_plain_request_is_rejected() {
        let response = app()
            .oneshot(Request::builder().uri("/guarded").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_header_value_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/guarded")
                    .header(REQUESTED_WITH_HEADER, "fetch")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
