use crate::error::Result;
use crate::models::{User, UserPreview};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Read-side boundary to the identity collaborator's user records.
///
/// Existence checks are fatal for their callers; preview lookups tolerate
/// absent users by simply omitting them from the result map.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_by_email_or_username(&self, needle: &str) -> Result<Option<User>>;

    /// Batch preview fetch for denormalization. Ids without a matching user
    /// are absent from the map.
    async fn previews_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserPreview>>;
}

/// Repository over the shared `users` table
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, username, country, gender, image, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email_or_username(&self, needle: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, username, country, gender, image, created_at, updated_at
            FROM users
            WHERE email = $1 OR username = $1
            "#,
        )
        .bind(needle)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn previews_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserPreview>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let previews = sqlx::query_as::<_, UserPreview>(
            r#"
            SELECT id, name, username, image
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(previews.into_iter().map(|p| (p.id, p)).collect())
    }
}
