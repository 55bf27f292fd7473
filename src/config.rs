/// Configuration management for the Tubely thumbnail service
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default ceiling for an in-memory multipart parse (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 << 20;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Base of every thumbnail locator handed back to clients
    pub public_url: String,
    pub max_upload_bytes: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub thumbnails: ThumbnailStorageConfig,
}

/// Thumbnail storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ThumbnailStorageConfig {
    /// `<assets_root>/<video_id>.<ext>`, served statically under `/assets`
    Disk { assets_root: PathBuf },
    /// Process-lifetime map, served by `/api/thumbnails/:video_id`
    Memory,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("TUBELY_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8091".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let public_url = env::var("TUBELY_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let max_upload_bytes = env::var("THUMBNAIL_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid upload size limit".to_string()))?;

        let database_path = env::var("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./tubely.db"));

        let thumbnails = match env::var("THUMBNAIL_STORAGE")
            .unwrap_or_else(|_| "disk".to_string())
            .to_lowercase()
            .as_str()
        {
            "disk" => ThumbnailStorageConfig::Disk {
                assets_root: env::var("ASSETS_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./assets")),
            },
            "memory" => ThumbnailStorageConfig::Memory,
            other => {
                return Err(ApiError::Validation(format!(
                    "Unknown thumbnail storage backend: {}",
                    other
                )))
            }
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ApiError::Validation("JWT secret required".to_string()))?;

        let log_level =
            env::var("RUST_LOG").unwrap_or_else(|_| "tubely=debug,tower_http=debug".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                max_upload_bytes,
            },
            storage: StorageConfig {
                database_path,
                thumbnails,
            },
            authentication: AuthConfig { jwt_secret },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.service.max_upload_bytes == 0 {
            return Err(ApiError::Validation(
                "Upload size limit must be greater than zero".to_string(),
            ));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }
}
