//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p samplegate-api`. Tests use the
//! local storage backend over a temp directory; no external services.

use axum_test::TestServer;
use samplegate_api::setup::routes;
use samplegate_api::state::AppState;
use samplegate_core::{Config, DeliveryMode, SampleId, StorageBackend};
use samplegate_storage::{LocalStorage, Storage};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server and owned storage directory.
pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Write an object directly into the backing store.
    pub async fn put_object(&self, key: &str, data: &[u8]) {
        write_object(self.temp_dir.path(), key, data).await;
    }

    /// Write a pointer record for an identifier.
    pub async fn put_pointer(&self, id: &str, json: &str) {
        let id = SampleId::parse(id).expect("valid test id");
        write_object(self.temp_dir.path(), &id.pointer_key(), json.as_bytes()).await;
    }
}

async fn write_object(dir: &Path, key: &str, data: &[u8]) {
    let path = dir.join(key);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .expect("create parent dir");
    }
    tokio::fs::write(&path, data).await.expect("write object");
}

fn test_config(delivery_mode: DeliveryMode) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        public_base: Some("https://samples.test".to_string()),
        delivery_mode,
        presign_expiry_secs: 3600,
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
    }
}

/// Setup a test app in presigned delivery mode.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_mode(DeliveryMode::Presigned).await
}

/// Setup a test app with an explicit delivery mode.
pub async fn setup_test_app_with_mode(delivery_mode: DeliveryMode) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(
            temp_dir.path().to_path_buf(),
            "http://files.test".to_string(),
        )
        .await
        .expect("Failed to create local storage"),
    );

    let config = test_config(delivery_mode);
    let state = Arc::new(AppState::new(storage, config.clone()));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");

    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp { server, temp_dir }
}
