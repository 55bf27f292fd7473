/// Thumbnail upload and serving endpoints
use crate::{
    auth::{authorize_video_owner, AuthContext},
    blob_store::memory::THUMBNAILS_ROUTE,
    context::AppContext,
    db::Video,
    error::{ApiError, ApiResult},
    metrics,
    validation::{extract_thumbnail, MULTIPART_OVERHEAD_BYTES},
};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

/// Build the upload route
pub fn routes(max_upload_bytes: usize) -> Router<AppContext> {
    Router::new().route(
        "/api/thumbnail/:video_id",
        post(upload_thumbnail)
            .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD_BYTES)),
    )
}

/// Build the retrieval route (in-memory backend only)
pub fn retrieval_routes() -> Router<AppContext> {
    Router::new().route(&format!("{}/:video_id", THUMBNAILS_ROUTE), get(get_thumbnail))
}

fn parse_video_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("Invalid ID: {}", raw)))
}

/// Upload a thumbnail for a video
///
/// Steps short-circuit in order: id, token, form, ownership, blob write,
/// record update. Nothing is written unless every check before it passed.
async fn upload_thumbnail(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
    auth: ApiResult<AuthContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Video>> {
    let result = store_thumbnail(&ctx, &video_id, auth, multipart).await;

    if let Err(e) = &result {
        metrics::record_upload_failure(e.code());
    }

    result.map(Json)
}

async fn store_thumbnail(
    ctx: &AppContext,
    video_id: &str,
    auth: ApiResult<AuthContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Video> {
    let video_id = parse_video_id(video_id)?;
    let user_id = auth?.user_id;

    tracing::info!("Uploading thumbnail for video {} by user {}", video_id, user_id);

    let multipart = multipart
        .map_err(|e| ApiError::Validation(format!("Unable to parse form: {}", e.body_text())))?;
    let upload = extract_thumbnail(multipart, ctx.config.service.max_upload_bytes).await?;

    let mut video = authorize_video_owner(ctx.videos.as_ref(), video_id, user_id).await?;

    let locator = ctx.thumbnails.put(video_id, upload).await.map_err(|e| {
        tracing::error!("Couldn't store thumbnail for video {}: {}", video_id, e);
        e
    })?;

    video.thumbnail_url = Some(locator);
    video.updated_at = Utc::now();

    // The blob is already written; a failed update leaves it orphaned
    ctx.videos.update_video(&video).await.map_err(|e| {
        tracing::error!("Couldn't update video {}: {}", video_id, e);
        ApiError::Internal(format!("Couldn't update video: {}", e))
    })?;

    Ok(video)
}

/// Serve a stored thumbnail with its media type
async fn get_thumbnail(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
) -> ApiResult<Response> {
    let video_id = parse_video_id(&video_id)?;

    let blob = ctx
        .thumbnails
        .get(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Thumbnail not found: {}", video_id)))?;

    Ok(([(header::CONTENT_TYPE, blob.media_type.mime_type())], blob.data).into_response())
}
