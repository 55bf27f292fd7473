/// Shared fixtures for in-crate tests
use crate::{
    auth::issue_access_token,
    blob_store::ThumbnailStore,
    config::{
        AuthConfig, LoggingConfig, ServerConfig, ServiceConfig, StorageConfig,
        ThumbnailStorageConfig, DEFAULT_MAX_UPLOAD_BYTES,
    },
    context::AppContext,
    db::{create_test_pool, NewVideo, SqliteVideoRepository, Video, VideoRepository},
};
use axum::{
    body::Body,
    http::{header, Method, Request},
};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const TEST_PUBLIC_URL: &str = "http://localhost:8091";
pub const BOUNDARY: &str = "tubely-test-boundary";

/// One part of a multipart body
pub struct Part<'a> {
    name: &'a str,
    content_type: Option<&'a str>,
    data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.content_type {
            Some(content_type) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"upload\"\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST a multipart form, optionally with a bearer token
pub fn multipart_request(uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

pub fn test_config(thumbnails: ThumbnailStorageConfig) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 8091,
            public_url: TEST_PUBLIC_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        },
        storage: StorageConfig {
            database_path: ":memory:".into(),
            thumbnails,
        },
        authentication: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// Context wired to an in-memory database and the given thumbnail backend
pub struct TestApp {
    pub ctx: AppContext,
    pub videos: Arc<SqliteVideoRepository>,
}

impl TestApp {
    pub async fn new(thumbnails: ThumbnailStorageConfig) -> Self {
        let store = ThumbnailStore::new(&thumbnails, TEST_PUBLIC_URL);
        Self::with_services(thumbnails, store, |videos| {
            videos as Arc<dyn VideoRepository>
        })
        .await
    }

    /// Build with a specific store and a repository layered over the
    /// seeded SQLite one
    pub async fn with_services<F>(
        thumbnails: ThumbnailStorageConfig,
        store: ThumbnailStore,
        repository: F,
    ) -> Self
    where
        F: FnOnce(Arc<SqliteVideoRepository>) -> Arc<dyn VideoRepository>,
    {
        let config = test_config(thumbnails);
        let videos = Arc::new(SqliteVideoRepository::new(create_test_pool().await));
        let ctx = AppContext::from_parts(config, repository(videos.clone()), Arc::new(store));

        Self { ctx, videos }
    }

    pub async fn create_video(&self, owner: Uuid) -> Video {
        self.videos
            .create_video(NewVideo {
                title: "Test video".to_string(),
                description: "uploaded from tests".to_string(),
                user_id: owner,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        issue_access_token(user_id, TEST_SECRET, chrono::Duration::hours(1))
    }
}
