//! External media tool wrappers: fast-start remux (ffmpeg) and aspect probe (ffprobe).

pub mod command;
#[cfg(all(test, unix))]
pub(crate) mod test_tools;
pub mod probe;
pub mod remux;

pub use command::ToolError;
pub use probe::{
    classify_aspect_ratio, probe_orientation, AspectProbe, FfprobeAspectProbe, ProbeError,
};
pub use remux::{processing_path_for, FastStartRemuxer, FfmpegRemuxer, RemuxError};
