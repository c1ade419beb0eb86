//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use std::sync::Arc;
use vidloft_core::Config;
use vidloft_db::PgVideoRepository;
use vidloft_processing::{FfmpegRemuxer, FfprobeAspectProbe};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    storage::setup_temp_dir(&config).await?;

    let timeout = config.media_tool_timeout();
    let remuxer = Arc::new(FfmpegRemuxer::new(config.ffmpeg_path(), timeout));
    let probe = Arc::new(FfprobeAspectProbe::new(config.ffprobe_path(), timeout));

    let state = Arc::new(AppState::new(
        config,
        Arc::new(PgVideoRepository::new(pool)),
        storage,
        remuxer,
        probe,
    ));

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
