/// Metrics and telemetry for the Tubely thumbnail service
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Thumbnail uploads and rejections
/// - Bytes written to the active blob backend
/// - Thumbnail retrievals

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // ========== Upload Metrics ==========

    /// Successful thumbnail uploads by media type and backend
    pub static ref THUMBNAIL_UPLOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "thumbnail_uploads_total",
        "Total number of stored thumbnail uploads",
        &["media_type", "backend"]
    )
    .unwrap();

    /// Rejected or failed uploads by error code
    pub static ref THUMBNAIL_UPLOAD_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "thumbnail_upload_failures_total",
        "Total number of thumbnail uploads that did not complete",
        &["reason"]
    )
    .unwrap();

    /// Size of stored thumbnails in bytes
    pub static ref THUMBNAIL_BYTES: HistogramVec = register_histogram_vec!(
        "thumbnail_bytes",
        "Size of stored thumbnails in bytes",
        &["backend"],
        vec![1024.0, 16384.0, 65536.0, 262144.0, 1048576.0, 4194304.0, 10485760.0]
    )
    .unwrap();

    // ========== Retrieval Metrics ==========

    /// Thumbnail fetches by outcome (hit / miss)
    pub static ref THUMBNAIL_FETCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "thumbnail_fetches_total",
        "Total number of thumbnail fetches",
        &["outcome"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record a stored thumbnail
pub fn record_thumbnail_upload(media_type: &str, backend: &str, size: usize) {
    THUMBNAIL_UPLOADS_TOTAL
        .with_label_values(&[media_type, backend])
        .inc();
    THUMBNAIL_BYTES
        .with_label_values(&[backend])
        .observe(size as f64);
}

/// Record an upload that ended in an error
pub fn record_upload_failure(reason: &str) {
    THUMBNAIL_UPLOAD_FAILURES_TOTAL
        .with_label_values(&[reason])
        .inc();
}

/// Record a thumbnail fetch
pub fn record_thumbnail_fetch(hit: bool) {
    THUMBNAIL_FETCHES_TOTAL
        .with_label_values(&[if hit { "hit" } else { "miss" }])
        .inc();
}
