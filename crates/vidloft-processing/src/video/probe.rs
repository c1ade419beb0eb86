use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use vidloft_core::Orientation;

use super::command::{run_tool, ToolError};

/// Reports the display aspect ratio (e.g. `"16:9"`) of a video file's first video stream.
#[async_trait]
pub trait AspectProbe: Send + Sync {
    async fn display_aspect_ratio(&self, path: &Path) -> Result<String, ProbeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("failed to parse ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no video stream with a display aspect ratio")]
    NoVideoStream,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    display_aspect_ratio: Option<String>,
}

impl FfprobeOutput {
    fn display_aspect_ratio(self) -> Result<String, ProbeError> {
        self.streams
            .into_iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .and_then(|s| s.display_aspect_ratio)
            .ok_or(ProbeError::NoVideoStream)
    }
}

/// ffprobe-backed aspect probe.
#[derive(Debug, Clone)]
pub struct FfprobeAspectProbe {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeAspectProbe {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    fn args(path: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-v"),
            OsString::from("error"),
            OsString::from("-print_format"),
            OsString::from("json"),
            OsString::from("-show_streams"),
            path.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl AspectProbe for FfprobeAspectProbe {
    #[tracing::instrument(
        skip(self),
        fields(
            process.executable.name = "ffprobe",
            process.executable.path = %self.ffprobe_path,
            ffmpeg.operation = "probe"
        )
    )]
    async fn display_aspect_ratio(&self, path: &Path) -> Result<String, ProbeError> {
        let start = Instant::now();
        let output = run_tool(&self.ffprobe_path, &Self::args(path), self.timeout, true).await?;
        let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
        let ratio = parsed.display_aspect_ratio()?;

        tracing::debug!(
            display_aspect_ratio = %ratio,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Probe completed"
        );
        Ok(ratio)
    }
}

/// Map a `W:H` display aspect ratio to an orientation.
///
/// Both sides are parsed as decimals and rounded, so `"16.0:9"` is landscape.
/// Anything unparseable is `Other`.
pub fn classify_aspect_ratio(ratio: &str) -> Orientation {
    let Some((w, h)) = ratio.trim().split_once(':') else {
        return Orientation::Other;
    };
    let (Ok(w), Ok(h)) = (w.trim().parse::<f64>(), h.trim().parse::<f64>()) else {
        return Orientation::Other;
    };
    if !w.is_finite() || !h.is_finite() {
        return Orientation::Other;
    }

    match (w.round() as i64, h.round() as i64) {
        (16, 9) => Orientation::Landscape,
        (9, 16) => Orientation::Portrait,
        _ => Orientation::Other,
    }
}

/// Classify the orientation of `path`. Probe failures are logged and yield `Other`.
pub async fn probe_orientation(probe: &dyn AspectProbe, path: &Path) -> Orientation {
    match probe.display_aspect_ratio(path).await {
        Ok(ratio) => classify_aspect_ratio(&ratio),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Aspect probe failed, classifying as other"
            );
            Orientation::Other
        }
    }
}
