//! Local staging of an upload body into a private temporary file.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use vidloft_core::AppError;

const STAGED_PREFIX: &str = "vidloft-upload-";
const STAGED_SUFFIX: &str = ".mp4";

/// A temporary file owned by one ingestion request.
///
/// The file is removed by `release`, or on drop when the owner returns early.
/// Removing a file that was never created is not an error.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    guard: Option<TempPath>,
    label: &'static str,
}

impl TempArtifact {
    pub fn new(guard: TempPath, label: &'static str) -> Self {
        Self {
            path: guard.to_path_buf(),
            guard: Some(guard),
            label,
        }
    }

    /// Guard a path the caller is about to create (e.g. a subprocess output).
    pub fn at(path: PathBuf, label: &'static str) -> Self {
        Self::new(TempPath::from_path(path), label)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };
        match guard.close() {
            Ok(()) => {
                tracing::debug!(
                    path = %self.path.display(),
                    artifact = self.label,
                    "Removed temporary file"
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    artifact = self.label,
                    "Failed to remove temporary file"
                );
            }
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Failure reported by the transport while streaming an upload body.
///
/// Readers wrap these in `io::Error` so the stager can tell body problems apart
/// from local disk failures.
#[derive(Debug, thiserror::Error)]
pub enum UploadBodyError {
    #[error("upload body exceeds the size limit")]
    LimitExceeded,

    #[error("upload body interrupted: {0}")]
    Interrupted(String),
}

impl From<UploadBodyError> for io::Error {
    fn from(err: UploadBodyError) -> Self {
        io::Error::other(err)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("upload exceeds maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("upload body could not be read: {0}")]
    Body(String),

    #[error("failed to stage upload: {0}")]
    Io(#[from] io::Error),
}

impl From<StageError> for AppError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::TooLarge { limit } => AppError::PayloadTooLarge(format!(
                "Video exceeds maximum upload size of {} bytes",
                limit
            )),
            StageError::Body(msg) => {
                AppError::InvalidInput(format!("Failed to read upload body: {}", msg))
            }
            StageError::Io(e) => AppError::Internal(format!("Failed to stage upload: {}", e)),
        }
    }
}

/// A fully written staged upload, rewound to the start.
#[derive(Debug)]
pub struct StagedUpload {
    pub artifact: TempArtifact,
    pub file: File,
    pub size_bytes: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.artifact.path()
    }
}

#[derive(Debug, Clone)]
pub struct LocalStager {
    temp_dir: PathBuf,
    max_bytes: u64,
}

impl LocalStager {
    pub fn new(temp_dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Stream `body` into a new uniquely named file under the temp dir.
    ///
    /// Reads at most one byte past the limit, so an oversized body is rejected
    /// without being consumed in full.
    pub async fn stage<R>(&self, body: R) -> Result<StagedUpload, StageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();
        let named = tempfile::Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(STAGED_SUFFIX)
            .tempfile_in(&self.temp_dir)?;
        let (std_file, temp_path) = named.into_parts();
        let artifact = TempArtifact::new(temp_path, "staged");
        let mut file = File::from_std(std_file);

        match self.copy_body(body, &mut file).await {
            Ok(size_bytes) => {
                tracing::debug!(
                    path = %artifact.path().display(),
                    size_bytes,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload staged"
                );
                Ok(StagedUpload {
                    artifact,
                    file,
                    size_bytes,
                })
            }
            Err(e) => {
                drop(file);
                artifact.release();
                Err(e)
            }
        }
    }

    async fn copy_body<R>(&self, body: R, file: &mut File) -> Result<u64, StageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut limited = body.take(self.max_bytes.saturating_add(1));
        let copied = tokio::io::copy(&mut limited, file)
            .await
            .map_err(|e| self.classify_copy_error(e))?;

        if copied > self.max_bytes {
            return Err(StageError::TooLarge {
                limit: self.max_bytes,
            });
        }

        file.flush().await?;
        file.sync_data().await?;
        file.rewind().await?;
        Ok(copied)
    }

    fn classify_copy_error(&self, err: io::Error) -> StageError {
        match err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<UploadBodyError>())
        {
            Some(UploadBodyError::LimitExceeded) => StageError::TooLarge {
                limit: self.max_bytes,
            },
            Some(UploadBodyError::Interrupted(msg)) => StageError::Body(msg.clone()),
            None => StageError::Io(err),
        }
    }
}
