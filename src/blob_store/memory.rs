/// In-memory thumbnail storage backend
use crate::{
    blob_store::{BlobBackend, MediaType, StorageKey, StoredBlob},
    error::ApiResult,
};
use async_trait::async_trait;
use axum::body::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// URL path prefix of the retrieval endpoint
pub const THUMBNAILS_ROUTE: &str = "/api/thumbnails";

/// Memory storage backend
///
/// Entries live until overwritten or the process exits. Each entry is
/// replaced whole under the write lock, so readers never see a torn entry.
pub struct MemoryBlobBackend {
    entries: RwLock<HashMap<Uuid, StoredBlob>>,
    public_url: String,
}

impl MemoryBlobBackend {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            public_url: public_url.into(),
        }
    }

    fn locator(&self, key: &StorageKey) -> String {
        format!("{}{}/{}", self.public_url, THUMBNAILS_ROUTE, key)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    async fn put(&self, key: &StorageKey, media_type: MediaType, data: Bytes) -> ApiResult<String> {
        let entry = StoredBlob { media_type, data };
        self.entries.write().await.insert(key.video_id(), entry);

        Ok(self.locator(key))
    }

    async fn get(&self, key: &StorageKey) -> ApiResult<Option<StoredBlob>> {
        Ok(self.entries.read().await.get(&key.video_id()).cloned())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_put_and_get_blob() {
        let backend = MemoryBlobBackend::new("http://localhost:8091");
        let key = StorageKey::for_video(Uuid::new_v4());

        let locator = backend
            .put(&key, MediaType::Jpeg, Bytes::from_static(b"jpeg bytes"))
            .await
            .unwrap();
        assert_eq!(
            locator,
            format!("http://localhost:8091/api/thumbnails/{}", key)
        );

        let blob = backend.get(&key).await.unwrap().unwrap();
        assert_eq!(blob.media_type, MediaType::Jpeg);
        assert_eq!(blob.data, Bytes::from_static(b"jpeg bytes"));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_entry() {
        let backend = MemoryBlobBackend::new("http://localhost:8091");
        let key = StorageKey::for_video(Uuid::new_v4());

        backend
            .put(&key, MediaType::Png, Bytes::from_static(b"first"))
            .await
            .unwrap();
        backend
            .put(&key, MediaType::Jpeg, Bytes::from_static(b"second"))
            .await
            .unwrap();

        let blob = backend.get(&key).await.unwrap().unwrap();
        assert_eq!(blob.media_type, MediaType::Jpeg);
        assert_eq!(blob.data, Bytes::from_static(b"second"));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let backend = MemoryBlobBackend::new("http://localhost:8091");
        let result = backend
            .get(&StorageKey::for_video(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_writers_never_tear_entries() {
        let backend = Arc::new(MemoryBlobBackend::new("http://localhost:8091"));
        let key = StorageKey::for_video(Uuid::new_v4());

        let png = Bytes::from(vec![1u8; 4096]);
        let jpeg = Bytes::from(vec![2u8; 2048]);

        let mut handles = Vec::new();
        for i in 0..32 {
            let backend = Arc::clone(&backend);
            let (media_type, data) = if i % 2 == 0 {
                (MediaType::Png, png.clone())
            } else {
                (MediaType::Jpeg, jpeg.clone())
            };
            handles.push(tokio::spawn(async move {
                backend.put(&key, media_type, data).await.unwrap();
                let blob = backend.get(&key).await.unwrap().unwrap();
                // Media type and bytes always come from the same write
                match blob.media_type {
                    MediaType::Png => assert!(blob.data.len() == 4096 && blob.data[0] == 1),
                    MediaType::Jpeg => assert!(blob.data.len() == 2048 && blob.data[0] == 2),
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(backend.len().await, 1);
    }
}
