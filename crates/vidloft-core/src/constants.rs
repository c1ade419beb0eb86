//! Shared constants

/// Hard ceiling for a single video upload (1 GiB).
pub const MAX_VIDEO_UPLOAD_BYTES: u64 = 1 << 30;

/// Multipart field carrying the video file.
pub const VIDEO_FIELD_NAME: &str = "video";

/// Content types accepted for video ingestion.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

/// Content types accepted for thumbnails.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Random bytes per storage key identifier.
pub const STORAGE_KEY_ENTROPY_BYTES: usize = 32;

/// Suffix appended to a staged file path for the remuxed output.
pub const PROCESSING_SUFFIX: &str = ".processing";
