//! Relocation of a finished local artifact into durable storage.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::File;
use vidloft_storage::{Storage, StorageError, StorageResult};

#[derive(Clone)]
pub struct StorageRelocator {
    storage: Arc<dyn Storage>,
}

impl StorageRelocator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Upload the file at `local_path` under `storage_key` and return its public URL.
    ///
    /// The local file is left in place; the caller owns its cleanup.
    #[tracing::instrument(skip(self, local_path), fields(storage.backend = %self.storage.backend_type()))]
    pub async fn relocate(
        &self,
        local_path: &Path,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let start = Instant::now();
        let file = File::open(local_path).await.map_err(StorageError::IoError)?;
        let content_length = file.metadata().await.map_err(StorageError::IoError)?.len();

        let stored = self
            .storage
            .upload_stream(
                storage_key,
                content_type,
                Some(content_length),
                Box::pin(file),
            )
            .await?;

        tracing::info!(
            size_bytes = stored,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video relocated to storage"
        );
        Ok(self.storage.public_url(storage_key))
    }
}
