//! Vidloft Database Library
//!
//! Record-store access for video records. The ingestion pipeline depends only on the
//! `VideoRepository` trait; `PgVideoRepository` is the PostgreSQL implementation.

pub mod video;

pub use video::{PgVideoRepository, VideoRepository, VideoRow};
