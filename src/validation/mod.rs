/// Thumbnail upload validation
///
/// Pulls the `thumbnail` field out of a multipart form, checks its declared
/// media type and enforces the size ceiling while the bytes are read.
use crate::{
    blob_store::{MediaType, ThumbnailUpload},
    error::{ApiError, ApiResult},
};
use axum::{
    body::Bytes,
    extract::multipart::{Multipart, MultipartError},
    http::StatusCode,
};

/// Name of the multipart field carrying the image
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Extra body allowance on top of the file ceiling for multipart framing
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Extract and validate the thumbnail from a multipart form
///
/// Other fields are skipped. Content type is checked before any bytes are
/// buffered; the ceiling is enforced on the accumulated field length.
pub async fn extract_thumbnail(
    mut multipart: Multipart,
    max_bytes: usize,
) -> ApiResult<ThumbnailUpload> {
    while let Some(mut field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string).ok_or_else(|| {
            ApiError::UnsupportedMediaType("Thumbnail has no content type".to_string())
        })?;
        let media_type = MediaType::from_content_type(&content_type).ok_or_else(|| {
            ApiError::UnsupportedMediaType(format!(
                "Invalid thumbnail type '{}', expected image/png or image/jpeg",
                content_type
            ))
        })?;

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(map_multipart_error)? {
            if data.len() + chunk.len() > max_bytes {
                return Err(too_large(max_bytes));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(ThumbnailUpload {
            media_type,
            data: Bytes::from(data),
        });
    }

    Err(ApiError::Validation(format!(
        "Unable to parse thumbnail: missing '{}' field",
        THUMBNAIL_FIELD
    )))
}

fn too_large(max_bytes: usize) -> ApiError {
    ApiError::PayloadTooLarge(format!(
        "Thumbnail exceeds maximum allowed size of {} bytes",
        max_bytes
    ))
}

/// Body-limit failures surface from the multipart stream as 413
fn map_multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::Validation(format!("Unable to parse form: {}", e.body_text()))
    }
}
