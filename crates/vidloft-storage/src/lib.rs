//! Vidloft Storage Library
//!
//! Durable object storage for ingested videos. It provides the `Storage` trait and
//! implementations for S3 (via `object_store`) and the local filesystem.
//!
//! # Storage key format
//!
//! Keys are `{orientation}/{random-id}.{ext}`. Keys must not contain `..` or a
//! leading `/`. Public URLs are derived from the key by the active backend.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectReader, Storage, StorageError, StorageResult};
pub use vidloft_core::StorageBackend;
