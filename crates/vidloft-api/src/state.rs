//! Shared application state handed to every handler.

use crate::auth::JwtVerifier;
use std::sync::Arc;
use vidloft_core::{Config, MediaTypeClassifier};
use vidloft_db::VideoRepository;
use vidloft_processing::{AspectProbe, FastStartRemuxer, IngestionConfig, IngestionOrchestrator};
use vidloft_storage::Storage;

pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub ingestion: IngestionOrchestrator,
    pub media_types: MediaTypeClassifier,
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    /// Wire the collaborators into one state. Setup passes the Postgres repository,
    /// the configured storage backend and the ffmpeg/ffprobe wrappers; tests pass fakes.
    pub fn new(
        config: Config,
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        remuxer: Arc<dyn FastStartRemuxer>,
        probe: Arc<dyn AspectProbe>,
    ) -> Self {
        let ingestion = IngestionOrchestrator::new(
            IngestionConfig::from_config(&config),
            storage,
            videos.clone(),
            remuxer,
            probe,
        );
        let jwt = Arc::new(JwtVerifier::new(config.jwt_secret()));

        Self {
            config,
            videos,
            ingestion,
            media_types: MediaTypeClassifier::for_video(),
            jwt,
        }
    }
}
