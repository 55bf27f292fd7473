/// Thumbnail Blob Storage
///
/// Persists thumbnail bytes under a key derived from the video id and hands
/// back the URL clients use to fetch them. One backend is active per process.

pub mod disk;
pub mod memory;
pub mod models;
pub mod store;

pub use models::*;
pub use store::ThumbnailStore;

use crate::error::ApiResult;
use async_trait::async_trait;
use axum::body::Bytes;

/// Blob storage backend trait
///
/// `put` returns the locator: an absolute URL that resolves to exactly the
/// bytes written, with the same media type.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store a blob, replacing whatever was stored under the key
    async fn put(&self, key: &StorageKey, media_type: MediaType, data: Bytes) -> ApiResult<String>;

    /// Retrieve a blob by key
    async fn get(&self, key: &StorageKey) -> ApiResult<Option<StoredBlob>>;

    /// Short backend name for logs and metrics
    fn name(&self) -> &'static str;
}
