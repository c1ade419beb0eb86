//! Vidloft Processing Library
//!
//! The video ingestion pipeline: local staging, fast-start remuxing, aspect-ratio
//! probing, relocation into durable storage and the orchestrator that sequences them.

pub mod orchestration;
pub mod relocation;
pub mod staging;
pub mod video;

pub use orchestration::{IngestState, IngestionConfig, IngestionOrchestrator};
pub use relocation::StorageRelocator;
pub use staging::{LocalStager, StageError, StagedUpload, TempArtifact, UploadBodyError};
pub use video::{
    classify_aspect_ratio, probe_orientation, processing_path_for, AspectProbe,
    FastStartRemuxer, FfmpegRemuxer, FfprobeAspectProbe, ProbeError, RemuxError, ToolError,
};
