/// API routes and handlers
pub mod thumbnail;

use crate::{
    blob_store::disk::ASSETS_ROUTE,
    config::{ServerConfig, ThumbnailStorageConfig},
    context::AppContext,
};
use axum::Router;
use tower_http::services::ServeDir;

/// Build API routes
///
/// The read path for thumbnails follows the active backend: static files
/// for disk, the retrieval endpoint for memory.
pub fn routes(config: &ServerConfig) -> Router<AppContext> {
    let router = Router::new().merge(thumbnail::routes(config.service.max_upload_bytes));

    match &config.storage.thumbnails {
        ThumbnailStorageConfig::Disk { assets_root } => {
            router.nest_service(ASSETS_ROUTE, ServeDir::new(assets_root))
        }
        ThumbnailStorageConfig::Memory => router.merge(thumbnail::retrieval_routes()),
    }
}
