use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use vidloft_core::constants::PROCESSING_SUFFIX;
use vidloft_core::AppError;

use super::command::{run_tool, ToolError};

/// Rewrites an mp4 container with its index at the front, without re-encoding.
#[async_trait]
pub trait FastStartRemuxer: Send + Sync {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), RemuxError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RemuxError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("remux produced no output at {}", .0.display())]
    MissingOutput(PathBuf),
}

impl From<RemuxError> for AppError {
    fn from(err: RemuxError) -> Self {
        match err {
            RemuxError::Tool(ToolError::Unavailable { tool, .. }) => {
                AppError::ToolUnavailable(format!("{} could not be started", tool))
            }
            other => AppError::RemuxFailed(other.to_string()),
        }
    }
}

/// Output path for a remux of `input`: the input path with `.processing` appended.
pub fn processing_path_for(input: &Path) -> PathBuf {
    let mut os: OsString = input.as_os_str().to_owned();
    os.push(PROCESSING_SUFFIX);
    PathBuf::from(os)
}

/// ffmpeg-backed remuxer.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    /// `-i <in> -c copy -movflags faststart -f mp4 <out>`
    pub fn args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-i"),
            input.as_os_str().to_owned(),
            OsString::from("-c"),
            OsString::from("copy"),
            OsString::from("-movflags"),
            OsString::from("faststart"),
            OsString::from("-f"),
            OsString::from("mp4"),
            output.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl FastStartRemuxer for FfmpegRemuxer {
    #[tracing::instrument(
        skip(self),
        fields(
            process.executable.name = "ffmpeg",
            process.executable.path = %self.ffmpeg_path,
            ffmpeg.operation = "faststart"
        )
    )]
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), RemuxError> {
        let start = Instant::now();
        let args = Self::args(input, output);

        if let Err(e) = run_tool(&self.ffmpeg_path, &args, self.timeout, false).await {
            tracing::warn!(error = %e, "ffmpeg remux failed");
            return Err(e.into());
        }

        if tokio::fs::metadata(output).await.is_err() {
            return Err(RemuxError::MissingOutput(output.to_path_buf()));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fast-start remux completed"
        );
        Ok(())
    }
}
