/// Disk-based thumbnail storage backend
use crate::{
    blob_store::{BlobBackend, MediaType, StorageKey, StoredBlob},
    error::{ApiError, ApiResult},
};
use async_trait::async_trait;
use axum::body::Bytes;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::{
    fs,
    io::AsyncWriteExt,
    sync::{Mutex, RwLock},
};
use uuid::Uuid;

/// URL path the assets directory is served under
pub const ASSETS_ROUTE: &str = "/assets";

/// Disk storage backend
///
/// Writes `<base>/<video_id>.<ext>`; the files are served statically under
/// [`ASSETS_ROUTE`], so the locator is a plain asset URL.
///
/// A write and the removal of the other-extension copy run under a per-video
/// lock, so concurrent uploads of different types always leave one file.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
    public_url: String,
    write_locks: Arc<RwLock<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl DiskBlobBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf, public_url: impl Into<String>) -> Self {
        Self {
            base_path,
            public_url: public_url.into(),
            write_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn acquire_key_lock(&self, key: &StorageKey) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.write().await;
        locks.entry(key.video_id()).or_default().clone()
    }

    async fn release_key_lock(&self, key: &StorageKey, lock: Arc<Mutex<()>>) {
        let mut locks = self.write_locks.write().await;
        // Only the map and this caller still hold it
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&key.video_id());
        }
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.write_locks.read().await.len()
    }

    async fn write_blob(&self, key: &StorageKey, media_type: MediaType, data: Bytes) -> ApiResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            ApiError::BlobStorage(format!("Failed to create assets directory: {}", e))
        })?;

        let blob_path = self.get_blob_path(key, media_type);

        let mut file = fs::File::create(&blob_path).await.map_err(|e| {
            ApiError::BlobStorage(format!("Couldn't create thumbnail file {}: {}", key, e))
        })?;
        file.write_all(&data).await.map_err(|e| {
            ApiError::BlobStorage(format!("Couldn't write thumbnail file {}: {}", key, e))
        })?;
        file.flush().await.map_err(|e| {
            ApiError::BlobStorage(format!("Couldn't write thumbnail file {}: {}", key, e))
        })?;

        self.remove_stale_variants(key, media_type).await
    }

    fn get_blob_path(&self, key: &StorageKey, media_type: MediaType) -> PathBuf {
        self.base_path.join(key.file_name(media_type))
    }

    fn locator(&self, key: &StorageKey, media_type: MediaType) -> String {
        format!(
            "{}{}/{}",
            self.public_url,
            ASSETS_ROUTE,
            key.file_name(media_type)
        )
    }

    /// Remove the copy stored under the other extension, if any
    async fn remove_stale_variants(&self, key: &StorageKey, keep: MediaType) -> ApiResult<()> {
        for media_type in MediaType::ALL.into_iter().filter(|m| *m != keep) {
            let path = self.get_blob_path(key, media_type);
            match fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Removed stale thumbnail {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::error!("Failed to remove {}: {}", path.display(), e);
                    return Err(ApiError::BlobStorage(format!(
                        "Failed to remove stale thumbnail {}.{}: {}",
                        key,
                        media_type.extension(),
                        e.kind()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    async fn put(&self, key: &StorageKey, media_type: MediaType, data: Bytes) -> ApiResult<String> {
        let lock = self.acquire_key_lock(key).await;
        let result = {
            let _guard = lock.lock().await;
            self.write_blob(key, media_type, data).await
        };
        self.release_key_lock(key, lock).await;

        result.map(|()| self.locator(key, media_type))
    }

    async fn get(&self, key: &StorageKey) -> ApiResult<Option<StoredBlob>> {
        for media_type in MediaType::ALL {
            let blob_path = self.get_blob_path(key, media_type);
            match fs::read(&blob_path).await {
                Ok(data) => {
                    return Ok(Some(StoredBlob {
                        media_type,
                        data: Bytes::from(data),
                    }))
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ApiError::BlobStorage(format!(
                        "Failed to read thumbnail {}: {}",
                        key, e
                    )))
                }
            }
        }

        Ok(None)
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
