//! Permission report API integration tests.
//!
//! Run with: `cargo test -p dropzone-api --test permission_test`

mod helpers;

use dropzone_services::host::{FailureSpec, HostOperation, InjectedFailure};
use helpers::{
    api_path, setup_test_app, EDITOR_USER, FILE_TYPE_ID, FOLDER_LOCATION, GALLERY_LOCATION,
    IMAGE_TYPE_ID,
};

const XHR: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

#[tokio::test]
async fn test_report_requires_xhr_header() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!("/permission-report/{}", FOLDER_LOCATION)))
        .await;

    assert_eq!(response.status_code(), 400);
    let data: serde_json::Value = response.json();
    assert_eq!(data["error"], "The request is not an AJAX request");
    assert_eq!(data["code"], "NOT_AJAX_REQUEST");
    assert_eq!(app.host.permission_queries().await, 0);
}

#[tokio::test]
async fn test_report_for_ambient_caller() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!("/permission-report/{}", FOLDER_LOCATION)))
        .add_header(XHR.0, XHR.1)
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["parentLocationId"], FOLDER_LOCATION);
    assert_eq!(data["module"], "content");
    assert_eq!(data["function"], "create");
    assert_eq!(data["allowedContentTypes"], serde_json::json!(["image"]));
    // One query per candidate: file and image
    assert_eq!(app.host.permission_queries().await, 2);
}

#[tokio::test]
async fn test_report_for_acting_user() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!(
            "/permission-report/{}?userId={}",
            FOLDER_LOCATION, EDITOR_USER
        )))
        .add_header(XHR.0, XHR.1)
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(
        data["allowedContentTypes"],
        serde_json::json!(["file", "image"])
    );
}

#[tokio::test]
async fn test_report_only_checks_location_candidates() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!("/permission-report/{}", GALLERY_LOCATION)))
        .add_header(XHR.0, XHR.1)
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["allowedContentTypes"], serde_json::json!(["image"]));
    assert_eq!(app.host.permission_queries().await, 1);
}

#[tokio::test]
async fn test_report_for_unknown_location_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/permission-report/999"))
        .add_header(XHR.0, XHR.1)
        .await;

    assert_eq!(response.status_code(), 404);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_oracle_failure_fails_whole_report() {
    let app = setup_test_app().await;
    app.host
        .inject_failure(InjectedFailure {
            operation: HostOperation::Permission,
            content_type: Some("file".to_string()),
            file_name: None,
            error: FailureSpec::Transport {
                message: "connection reset".to_string(),
            },
        })
        .await;

    let response = app
        .client()
        .get(&api_path(&format!("/permission-report/{}", FOLDER_LOCATION)))
        .add_header(XHR.0, XHR.1)
        .await;

    assert_eq!(response.status_code(), 502);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "PERMISSION_CHECK_FAILED");
    assert_eq!(data["recoverable"], true);
    assert!(data.get("allowedContentTypes").is_none());
    // Sensitive: host details never reach the client
    assert!(data.get("details").is_none());
}

#[tokio::test]
async fn test_point_check() {
    let app = setup_test_app().await;

    let allowed = app
        .client()
        .get(&api_path(&format!(
            "/check-permission/{}/{}",
            FOLDER_LOCATION, IMAGE_TYPE_ID
        )))
        .add_header(XHR.0, XHR.1)
        .await;
    assert_eq!(allowed.status_code(), 200);
    let data: serde_json::Value = allowed.json();
    assert_eq!(data["parentLocationId"], FOLDER_LOCATION);
    assert_eq!(data["contentTypeId"], IMAGE_TYPE_ID);
    assert_eq!(data["module"], "content");
    assert_eq!(data["function"], "create");
    assert_eq!(data["allowed"], true);

    let denied = app
        .client()
        .get(&api_path(&format!(
            "/check-permission/{}/{}",
            FOLDER_LOCATION, FILE_TYPE_ID
        )))
        .add_header(XHR.0, XHR.1)
        .await;
    assert_eq!(denied.status_code(), 200);
    let data: serde_json::Value = denied.json();
    assert_eq!(data["allowed"], false);
}

#[tokio::test]
async fn test_point_check_requires_xhr_header() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!(
            "/check-permission/{}/{}",
            FOLDER_LOCATION, IMAGE_TYPE_ID
        )))
        .add_header("X-Requested-With", "fetch")
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_point_check_unknown_content_type() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!("/check-permission/{}/999", FOLDER_LOCATION)))
        .add_header(XHR.0, XHR.1)
        .await;

    assert_eq!(response.status_code(), 404);
}
