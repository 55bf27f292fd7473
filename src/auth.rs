/// Authentication extractors and the video ownership gate
use crate::{
    context::AppContext,
    db::{Video, VideoRepository},
    error::{ApiError, ApiResult},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer stamped on access tokens
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated context - extracts and validates the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Authentication("Couldn't find JWT".to_string()))?;

        let user_id = verify_access_token(bearer.token(), &state.config.authentication.jwt_secret)?;

        Ok(AuthContext { user_id })
    }
}

/// Verify an HS256 access token and return the user it was issued to
pub fn verify_access_token(token: &str, jwt_secret: &str) -> ApiResult<Uuid> {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ApiError::Authentication("Token has expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::Authentication("Invalid token signature".to_string())
            }
            _ => ApiError::Authentication(format!("Couldn't validate JWT: {}", e)),
        }
    })?;

    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| ApiError::Authentication("Invalid JWT: subject is not a user id".to_string()))
}

/// Fetch a video and require that `user_id` owns it
///
/// Must run before anything is written on the caller's behalf.
pub async fn authorize_video_owner(
    videos: &dyn VideoRepository,
    video_id: Uuid,
    user_id: Uuid,
) -> ApiResult<Video> {
    let video = videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Video not found: {}", video_id)))?;

    if video.user_id != user_id {
        tracing::warn!(
            "User {} attempted to modify video {} owned by {}",
            user_id,
            video_id,
            video.user_id
        );
        return Err(ApiError::Authorization(
            "You don't own this video".to_string(),
        ));
    }

    Ok(video)
}

/// Mint an access token the way the account service does
#[cfg(test)]
pub fn issue_access_token(user_id: Uuid, jwt_secret: &str, ttl: chrono::Duration) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, NewVideo, SqliteVideoRepository};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_verify_valid_token() {
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, SECRET, chrono::Duration::hours(1));

        assert_eq!(verify_access_token(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::hours(1));
        let result = verify_access_token(&token, "another-secret-another-secret-xx");
        assert!(matches!(result, Err(ApiError::Authentication(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::hours(-2));
        let result = verify_access_token(&token, SECRET);
        assert!(matches!(result, Err(ApiError::Authentication(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_access_token("not-a-jwt", SECRET).is_err());
    }

    #[tokio::test]
    async fn test_owner_passes_gate() {
        let repo = SqliteVideoRepository::new(create_test_pool().await);
        let owner = Uuid::new_v4();
        let video = repo
            .create_video(NewVideo {
                title: "mine".to_string(),
                description: String::new(),
                user_id: owner,
            })
            .await
            .unwrap();

        let authorized = authorize_video_owner(&repo, video.id, owner).await.unwrap();
        assert_eq!(authorized.id, video.id);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let repo = SqliteVideoRepository::new(create_test_pool().await);
        let video = repo
            .create_video(NewVideo {
                title: "theirs".to_string(),
                description: String::new(),
                user_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        let result = authorize_video_owner(&repo, video.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_unknown_video_is_not_found() {
        let repo = SqliteVideoRepository::new(create_test_pool().await);
        let result = authorize_video_owner(&repo, Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
