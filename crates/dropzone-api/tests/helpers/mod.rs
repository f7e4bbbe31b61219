//! Test helpers: build AppState and router for integration tests.
//!
//! Every test gets its own in-memory host; `TestApp::host` shares state with
//! the host behind the router, so tests can seed it and inspect it.

#![allow(dead_code)]

use axum_test::TestServer;
use dropzone_api::constants;
use dropzone_api::setup::routes;
use dropzone_api::state::AppState;
use dropzone_core::models::Location;
use dropzone_core::{normalize, BaseConfig, Config, LogFormat, RawMappingConfig};
use dropzone_services::host::Grant;
use dropzone_services::InMemoryHost;
use std::path::PathBuf;
use std::sync::Arc;

pub const GALLERY_LOCATION: u64 = 20;
pub const FOLDER_LOCATION: u64 = 30;
pub const IMAGE_TYPE_ID: u64 = 3;
pub const FILE_TYPE_ID: u64 = 4;
/// User with extra grants under the folder location.
pub const EDITOR_USER: u64 = 7;

/// Galleries take images only; anything else routes through the defaults and
/// the `file` fallback. Limit is 16 bytes so size checks stay cheap.
pub const MAPPINGS: &str = r#"
location_mappings:
  - content_type_identifier: gallery
    mime_type_filter: ["image/*"]
    mappings:
      - mime_types: [image/png, image/jpeg]
        content_type_identifier: image
        content_field_identifier: image
default_mappings:
  - mime_type: application/pdf
    content_type_identifier: file
    content_field_identifier: file
    name_field_identifier: title
  - mime_types: [image/png]
    content_type_identifier: image
    content_field_identifier: image
fallback_content_type:
  content_type_identifier: file
  content_field_identifier: file
max_file_size: 16
"#;

pub const MAPPINGS_WITHOUT_FALLBACK: &str = r#"
default_mappings:
  - mime_types: [image/png]
    content_type_identifier: image
    content_field_identifier: image
max_file_size: 16
"#;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub host: InMemoryHost,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(MAPPINGS).await
}

pub async fn setup_test_app_with(mappings: &str) -> TestApp {
    build_test_app(mappings, create_test_config()).await
}

pub async fn setup_test_app_with_timeout(request_timeout_secs: u64) -> TestApp {
    let mut config = create_test_config();
    config.base.request_timeout_secs = request_timeout_secs;
    build_test_app(MAPPINGS, config).await
}

async fn build_test_app(mappings: &str, config: Config) -> TestApp {
    let raw = RawMappingConfig::from_yaml_str(mappings).expect("Failed to parse test mappings");
    let mapping = normalize(&raw).expect("Failed to normalize test mappings");

    let host = seeded_host().await;
    let state = Arc::new(AppState::with_host(config.clone(), mapping, host.clone()));

    let app = routes::setup_routes(&config, state)
        .await
        .expect("Failed to setup routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp { server, host }
}

async fn seeded_host() -> InMemoryHost {
    let host = InMemoryHost::new();
    host.add_content_type(1, "gallery").await;
    host.add_content_type(2, "folder").await;
    host.add_content_type(IMAGE_TYPE_ID, "image").await;
    host.add_content_type(FILE_TYPE_ID, "file").await;
    host.add_location(Location {
        id: GALLERY_LOCATION,
        content_id: 200,
        content_type_id: 1,
    })
    .await;
    host.add_location(Location {
        id: FOLDER_LOCATION,
        content_id: 300,
        content_type_id: 2,
    })
    .await;
    host.grant(Grant {
        user_id: None,
        location_id: None,
        content_types: vec!["image".to_string()],
    })
    .await;
    host.grant(Grant {
        user_id: Some(EDITOR_USER),
        location_id: Some(FOLDER_LOCATION),
        content_types: vec!["image".to_string(), "file".to_string()],
    })
    .await;
    host
}

fn create_test_config() -> Config {
    Config {
        base: BaseConfig {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            request_timeout_secs: 60,
            log_format: LogFormat::Text,
        },
        mapping_config_path: PathBuf::from("mappings.yaml"),
        host_fixture_path: None,
    }
}
