//! In-memory collaborators with injectable failures.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::AsyncReadExt;
use uuid::Uuid;
use vidloft_core::{AppError, StorageBackend, Video};
use vidloft_db::VideoRepository;
use vidloft_processing::{AspectProbe, FastStartRemuxer, ProbeError, RemuxError, ToolError};
use vidloft_storage::{ObjectReader, Storage, StorageError, StorageResult};

pub const TEST_DISTRIBUTION: &str = "d111111abcdef8.cloudfront.net";

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<HashMap<String, StoredObject>>,
    pub puts: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeStorage {
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: ObjectReader,
    ) -> StorageResult<u64> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("bucket unavailable".to_string()));
        }
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let len = data.len() as u64;
        self.objects.lock().unwrap().insert(
            storage_key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(len)
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://{}/{}", TEST_DISTRIBUTION, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[derive(Default)]
pub struct FakeVideos {
    pub videos: Mutex<HashMap<Uuid, Video>>,
    pub fail_updates: AtomicBool,
}

impl FakeVideos {
    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl VideoRepository for FakeVideos {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection closed".to_string()));
        }
        self.insert(video.clone());
        Ok(video.clone())
    }
}

/// Copies input to output; optionally fails after leaving a partial output behind.
#[derive(Default)]
pub struct FakeRemuxer {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeRemuxer {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FastStartRemuxer for FakeRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), RemuxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            tokio::fs::write(output, b"partial").await.unwrap();
            return Err(RemuxError::Tool(ToolError::Failed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "moov atom not found".to_string(),
            }));
        }
        tokio::fs::copy(input, output).await.unwrap();
        Ok(())
    }
}

/// Returns a fixed ratio, or fails when `ratio` is `None`.
pub struct FakeProbe {
    pub ratio: Mutex<Option<String>>,
}

impl FakeProbe {
    pub fn new(ratio: Option<&str>) -> Self {
        Self {
            ratio: Mutex::new(ratio.map(String::from)),
        }
    }

    pub fn set_ratio(&self, ratio: Option<&str>) {
        *self.ratio.lock().unwrap() = ratio.map(String::from);
    }
}

#[async_trait]
impl AspectProbe for FakeProbe {
    async fn display_aspect_ratio(&self, _path: &Path) -> Result<String, ProbeError> {
        self.ratio
            .lock()
            .unwrap()
            .clone()
            .ok_or(ProbeError::NoVideoStream)
    }
}
