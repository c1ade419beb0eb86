//! Sequencing of one upload through stage, remux, classify, upload and persist.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncRead;
use vidloft_core::{AppError, ClassifiedMediaType, Config, KeyGenerator, Video};
use vidloft_db::VideoRepository;
use vidloft_storage::Storage;

use crate::relocation::StorageRelocator;
use crate::staging::{LocalStager, StagedUpload, TempArtifact};
use crate::video::{probe_orientation, processing_path_for, AspectProbe, FastStartRemuxer};

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub temp_dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl IngestionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temp_dir: config.upload_temp_dir().to_path_buf(),
            max_upload_bytes: config.max_video_upload_bytes(),
        }
    }
}

/// Progress of a single ingestion. Only moves forward; any step may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Received,
    Staged,
    Remuxed,
    Classified,
    Uploaded,
    Persisted,
    Failed,
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IngestState::Received => "received",
            IngestState::Staged => "staged",
            IngestState::Remuxed => "remuxed",
            IngestState::Classified => "classified",
            IngestState::Uploaded => "uploaded",
            IngestState::Persisted => "persisted",
            IngestState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

pub struct IngestionOrchestrator {
    stager: LocalStager,
    relocator: StorageRelocator,
    videos: Arc<dyn VideoRepository>,
    remuxer: Arc<dyn FastStartRemuxer>,
    probe: Arc<dyn AspectProbe>,
    keys: KeyGenerator,
}

impl IngestionOrchestrator {
    pub fn new(
        config: IngestionConfig,
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoRepository>,
        remuxer: Arc<dyn FastStartRemuxer>,
        probe: Arc<dyn AspectProbe>,
    ) -> Self {
        Self {
            stager: LocalStager::new(config.temp_dir, config.max_upload_bytes),
            relocator: StorageRelocator::new(storage),
            videos,
            remuxer,
            probe,
            keys: KeyGenerator::new(),
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.stager.max_bytes()
    }

    /// Ingest `body` as the new content of `video` and return the updated record.
    ///
    /// The caller has already authorized the request and classified the declared
    /// content type. Every temporary file is gone when this returns, on any path.
    #[tracing::instrument(skip(self, video, body), fields(video_id = %video.id, media_type = %media.media_type))]
    pub async fn ingest<R>(
        &self,
        video: &Video,
        media: &ClassifiedMediaType,
        body: R,
    ) -> Result<Video, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();
        let mut state = IngestState::Received;

        match self.run(&mut state, video, media, body).await {
            Ok(updated) => {
                tracing::info!(
                    state = %state,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video ingestion completed"
                );
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    last_state = %state,
                    state = %IngestState::Failed,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video ingestion failed"
                );
                Err(e)
            }
        }
    }

    async fn run<R>(
        &self,
        state: &mut IngestState,
        video: &Video,
        media: &ClassifiedMediaType,
        body: R,
    ) -> Result<Video, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let StagedUpload {
            artifact: staged,
            file,
            size_bytes,
        } = self.stager.stage(body).await?;
        drop(file);
        advance(state, IngestState::Staged);
        tracing::debug!(size_bytes, "Upload body staged");

        let processed = TempArtifact::at(processing_path_for(staged.path()), "processed");
        if let Err(e) = self.remuxer.remux(staged.path(), processed.path()).await {
            processed.release();
            staged.release();
            return Err(e.into());
        }
        staged.release();
        advance(state, IngestState::Remuxed);

        let orientation = probe_orientation(self.probe.as_ref(), processed.path()).await;
        advance(state, IngestState::Classified);

        let storage_key = self.keys.storage_key(orientation, &media.extension)?;
        let uploaded = self
            .relocator
            .relocate(processed.path(), &storage_key, &media.media_type)
            .await;
        processed.release();
        let video_url = uploaded.map_err(|e| {
            AppError::StorageUploadFailed(format!("Upload of {} failed: {}", storage_key, e))
        })?;
        advance(state, IngestState::Uploaded);

        let updated = self
            .videos
            .update_video(&video.with_video_url(video_url))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    storage_key = %storage_key,
                    "Record update failed; stored object is orphaned"
                );
                AppError::RecordUpdateFailed(Box::new(e))
            })?;
        advance(state, IngestState::Persisted);

        Ok(updated)
    }
}

fn advance(state: &mut IngestState, next: IngestState) {
    tracing::debug!(from = %state, to = %next, "Ingestion state transition");
    *state = next;
}
