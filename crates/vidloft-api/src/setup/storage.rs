//! Storage and scratch space setup

use anyhow::{Context, Result};
use std::sync::Arc;
use vidloft_core::Config;
use vidloft_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage backend...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Storage backend initialized successfully"
    );
    Ok(storage)
}

/// Make sure the directory for staged and processed uploads exists.
pub async fn setup_temp_dir(config: &Config) -> Result<()> {
    let dir = config.upload_temp_dir();
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create upload temp dir {}", dir.display()))?;
    tracing::info!(path = %dir.display(), "Upload temp dir ready");
    Ok(())
}
