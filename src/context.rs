/// Application context and dependency injection
use crate::{
    blob_store::ThumbnailStore,
    config::{ServerConfig, ThumbnailStorageConfig},
    db::{self, SqliteVideoRepository, VideoRepository},
    error::{ApiError, ApiResult},
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub videos: Arc<dyn VideoRepository>,
    pub thumbnails: Arc<ThumbnailStore>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create asset directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Initialize video database
        let pool = db::create_pool(&config.storage.database_path, db::DatabaseOptions::default())
            .await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let videos = Arc::new(SqliteVideoRepository::new(pool));

        // Initialize the one active thumbnail backend
        let thumbnails = Arc::new(ThumbnailStore::new(
            &config.storage.thumbnails,
            &config.service.public_url,
        ));
        tracing::info!("Thumbnail storage backend: {}", thumbnails.backend_name());

        Ok(Self::from_parts(config, videos, thumbnails))
    }

    /// Assemble a context from already-built services
    pub fn from_parts(
        config: ServerConfig,
        videos: Arc<dyn VideoRepository>,
        thumbnails: Arc<ThumbnailStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            videos,
            thumbnails,
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ApiResult<()> {
        if let ThumbnailStorageConfig::Disk { assets_root } = &config.storage.thumbnails {
            tokio::fs::create_dir_all(assets_root).await.map_err(|e| {
                ApiError::Internal(format!(
                    "Failed to create directory {:?}: {}",
                    assets_root, e
                ))
            })?;
        }

        Ok(())
    }
}
