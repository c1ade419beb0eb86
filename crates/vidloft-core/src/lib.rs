//! Vidloft Core Library
//!
//! This crate provides the domain models, error types, configuration and the small
//! pure building blocks (media type classification, storage key generation) shared
//! by every Vidloft component.

pub mod config;
pub mod constants;
pub mod error;
pub mod keys;
pub mod media_type;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use keys::KeyGenerator;
pub use media_type::{ClassifiedMediaType, MediaTypeClassifier};
pub use models::{Orientation, Video, VideoResponse};
pub use storage_types::StorageBackend;
