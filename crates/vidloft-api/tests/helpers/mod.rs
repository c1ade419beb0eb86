//! Test helpers: build AppState and router over in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p vidloft-api --test video_upload_test`.

#![allow(dead_code)]

pub mod auth;
pub mod fakes;
pub mod fixtures;

use axum_test::TestServer;
use fakes::{FakeProbe, FakeRemuxer, FakeStorage, FakeVideos};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use vidloft_api::constants;
use vidloft_api::setup::routes;
use vidloft_api::state::AppState;
use vidloft_core::constants::MAX_VIDEO_UPLOAD_BYTES;
use vidloft_core::{Config, StorageBackend};

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn upload_path(video_id: impl std::fmt::Display) -> String {
    api_path(&format!("/videos/{}/upload", video_id))
}

/// Test application: server plus handles on every fake it was built from.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<FakeStorage>,
    pub videos: Arc<FakeVideos>,
    pub remuxer: Arc<FakeRemuxer>,
    pub probe: Arc<FakeProbe>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of entries left in the upload temp dir.
    pub fn temp_entries(&self) -> usize {
        count_entries(self.temp_dir.path())
    }
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("Failed to read temp dir")
        .count()
}

pub fn create_test_config(temp_dir: &Path, max_video_upload_bytes: u64) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        database_url: "postgresql://localhost/vidloft_test".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        jwt_secret: auth::TEST_JWT_SECRET.to_string(),
        cors_origins: vec!["*".to_string()],
        storage_backend: StorageBackend::S3,
        s3_bucket: Some("vidloft-test".to_string()),
        s3_region: Some("us-east-1".to_string()),
        s3_endpoint: None,
        aws_region: None,
        s3_cf_distribution: Some(fakes::TEST_DISTRIBUTION.to_string()),
        local_storage_path: None,
        local_storage_base_url: None,
        max_video_upload_bytes,
        upload_temp_dir: temp_dir.to_path_buf(),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        media_tool_timeout_secs: 30,
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_limit(MAX_VIDEO_UPLOAD_BYTES).await
}

/// Setup test app with an isolated temp dir and the given upload ceiling.
pub async fn setup_test_app_with_limit(max_video_upload_bytes: u64) -> TestApp {
    setup_test_app_with(|config| config.max_video_upload_bytes = max_video_upload_bytes).await
}

/// Setup test app from the default test config adjusted by `configure`.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = create_test_config(temp_dir.path(), MAX_VIDEO_UPLOAD_BYTES);
    configure(&mut config);

    let storage = Arc::new(FakeStorage::default());
    let videos = Arc::new(FakeVideos::default());
    let remuxer = Arc::new(FakeRemuxer::default());
    let probe = Arc::new(FakeProbe::new(Some("16:9")));

    let state = Arc::new(AppState::new(
        config,
        videos.clone(),
        storage.clone(),
        remuxer.clone(),
        probe.clone(),
    ));
    let app = routes::setup_routes(state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        videos,
        remuxer,
        probe,
        temp_dir,
    }
}
