/// Video records and their repository
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Video record
///
/// Owned by exactly one user. This service only ever changes
/// `thumbnail_url` (and `updated_at` alongside it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
}

/// Fields needed to seed a video
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
}

/// Access to video records
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn get_video(&self, id: Uuid) -> ApiResult<Option<Video>>;

    /// Persist the mutable fields of an existing record, `updated_at` included
    async fn update_video(&self, video: &Video) -> ApiResult<()>;
}

/// SQLite-backed video repository
#[derive(Clone)]
pub struct SqliteVideoRepository {
    db: SqlitePool,
}

impl SqliteVideoRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn parse_uuid(row: &SqliteRow, column: &str) -> ApiResult<Uuid> {
        let raw: String = row.try_get(column)?;
        Uuid::parse_str(&raw)
            .map_err(|e| ApiError::Internal(format!("Corrupt {} column '{}': {}", column, raw, e)))
    }

    fn row_to_video(row: &SqliteRow) -> ApiResult<Video> {
        Ok(Video {
            id: Self::parse_uuid(row, "id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            thumbnail_url: row.try_get("thumbnail_url")?,
            video_url: row.try_get("video_url")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            user_id: Self::parse_uuid(row, "user_id")?,
        })
    }
}

#[async_trait]
impl VideoRepository for SqliteVideoRepository {
    async fn get_video(&self, id: Uuid) -> ApiResult<Option<Video>> {
        let row = sqlx::query(
            r#"
            SELECT id, created_at, updated_at, thumbnail_url, video_url, title, description, user_id
            FROM videos
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(Self::row_to_video).transpose()
    }

    async fn update_video(&self, video: &Video) -> ApiResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = ?, description = ?, thumbnail_url = ?, video_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.updated_at)
        .bind(video.id.to_string())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Video not found: {}", video.id)));
        }

        Ok(())
    }
}

#[cfg(test)]
impl SqliteVideoRepository {
    /// Seed a record with no thumbnail yet
    pub async fn create_video(&self, new_video: NewVideo) -> ApiResult<Video> {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
            title: new_video.title,
            description: new_video.description,
            user_id: new_video.user_id,
        };

        sqlx::query(
            r#"
            INSERT INTO videos (id, created_at, updated_at, title, description, thumbnail_url, video_url, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(video.id.to_string())
        .bind(video.created_at)
        .bind(video.updated_at)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.user_id.to_string())
        .execute(&self.db)
        .await?;

        Ok(video)
    }
}
