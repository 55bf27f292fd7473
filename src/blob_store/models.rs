/// Thumbnail blob data models
use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Accepted thumbnail media types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Png,
    Jpeg,
}

impl MediaType {
    pub const ALL: [MediaType; 2] = [MediaType::Png, MediaType::Jpeg];

    /// Map a declared `Content-Type` to a media type. Only exact matches count.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/png" => Some(MediaType::Png),
            "image/jpeg" => Some(MediaType::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }

    /// Extension token used in file names and asset locators
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Png => "png",
            MediaType::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Address of a thumbnail inside a blob backend. One key per video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageKey(Uuid);

impl StorageKey {
    pub fn for_video(video_id: Uuid) -> Self {
        Self(video_id)
    }

    pub fn video_id(&self) -> Uuid {
        self.0
    }

    /// `<video_id>.<ext>`
    pub fn file_name(&self, media_type: MediaType) -> String {
        format!("{}.{}", self.0, media_type.extension())
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub media_type: MediaType,
    pub data: Bytes,
}

/// A validated upload, ready to be written
#[derive(Debug, Clone)]
pub struct ThumbnailUpload {
    pub media_type: MediaType,
    pub data: Bytes,
}
