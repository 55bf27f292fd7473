/// Thumbnail Store Manager
///
/// Owns the one active blob backend and is what the handlers talk to.
use crate::{
    blob_store::{
        disk::DiskBlobBackend, memory::MemoryBlobBackend, BlobBackend, StorageKey, StoredBlob,
        ThumbnailUpload,
    },
    config::ThumbnailStorageConfig,
    error::ApiResult,
    metrics,
};
use std::sync::Arc;
use uuid::Uuid;

/// Main thumbnail store
#[derive(Clone)]
pub struct ThumbnailStore {
    backend: Arc<dyn BlobBackend>,
}

impl ThumbnailStore {
    /// Create the store for the configured backend
    pub fn new(config: &ThumbnailStorageConfig, public_url: &str) -> Self {
        let backend: Arc<dyn BlobBackend> = match config {
            ThumbnailStorageConfig::Disk { assets_root } => {
                Arc::new(DiskBlobBackend::new(assets_root.clone(), public_url))
            }
            ThumbnailStorageConfig::Memory => Arc::new(MemoryBlobBackend::new(public_url)),
        };

        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Arc<dyn BlobBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Store the thumbnail for a video and return its locator
    pub async fn put(&self, video_id: Uuid, upload: ThumbnailUpload) -> ApiResult<String> {
        let key = StorageKey::for_video(video_id);
        let size = upload.data.len();
        let media_type = upload.media_type;

        let locator = self.backend.put(&key, media_type, upload.data).await?;

        metrics::record_thumbnail_upload(media_type.mime_type(), self.backend.name(), size);
        tracing::info!(
            "Stored {} byte {} thumbnail for video {} in {} backend",
            size,
            media_type,
            video_id,
            self.backend.name()
        );

        Ok(locator)
    }

    /// Fetch the thumbnail for a video
    pub async fn get(&self, video_id: Uuid) -> ApiResult<Option<StoredBlob>> {
        let blob = self.backend.get(&StorageKey::for_video(video_id)).await?;
        metrics::record_thumbnail_fetch(blob.is_some());
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::MediaType;
    use axum::body::Bytes;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = ThumbnailStore::new(&ThumbnailStorageConfig::Memory, "http://localhost:8091");
        let video_id = Uuid::new_v4();

        let locator = store
            .put(
                video_id,
                ThumbnailUpload {
                    media_type: MediaType::Png,
                    data: Bytes::from_static(b"0123456789"),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.backend_name(), "memory");
        assert_eq!(
            locator,
            format!("http://localhost:8091/api/thumbnails/{}", video_id)
        );

        let blob = store.get(video_id).await.unwrap().unwrap();
        assert_eq!(blob.data.len(), 10);
        assert_eq!(blob.media_type, MediaType::Png);
    }

    #[tokio::test]
    async fn test_disk_store_locator_uses_extension() {
        let dir = tempdir().unwrap();
        let config = ThumbnailStorageConfig::Disk {
            assets_root: dir.path().to_path_buf(),
        };
        let store = ThumbnailStore::new(&config, "https://cdn.example.com");
        let video_id = Uuid::new_v4();

        let locator = store
            .put(
                video_id,
                ThumbnailUpload {
                    media_type: MediaType::Jpeg,
                    data: Bytes::from_static(b"jpeg"),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.backend_name(), "disk");
        assert_eq!(
            locator,
            format!("https://cdn.example.com/assets/{}.jpeg", video_id)
        );
    }

    #[tokio::test]
    async fn test_get_unknown_video() {
        let store = ThumbnailStore::new(&ThumbnailStorageConfig::Memory, "http://localhost:8091");
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
