use crate::error::Result;
use crate::models::{PostLike, PostLikeWithUser, ToggleOutcome, UserPreview};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct PostLikeUserRow {
    id: Uuid,
    post_id: Uuid,
    created_at: DateTime<Utc>,
    liker_id: Option<Uuid>,
    liker_name: Option<String>,
    liker_username: Option<String>,
    liker_image: Option<String>,
}

impl From<PostLikeUserRow> for PostLikeWithUser {
    fn from(row: PostLikeUserRow) -> Self {
        let user = match (row.liker_id, row.liker_name, row.liker_username) {
            (Some(id), Some(name), Some(username)) => Some(UserPreview {
                id,
                name,
                username,
                image: row.liker_image,
            }),
            _ => None,
        };

        PostLikeWithUser {
            id: row.id,
            post_id: row.post_id,
            created_at: row.created_at,
            user,
        }
    }
}

/// Store owning the `post_likes` table.
///
/// The `(user_id, post_id)` pair is unique at the storage layer; `toggle`
/// flips presence atomically, so two rapid toggles always cancel out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostLikeStore: Send + Sync {
    async fn toggle(&self, user_id: Uuid, post_id: Uuid) -> Result<ToggleOutcome<PostLike>>;

    async fn has_user_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64>;

    /// Likes of a post, newest first, with liker previews.
    async fn list_by_post(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostLikeWithUser>>;

    /// Up to `per_post` newest likes for each of the given posts.
    async fn recent_by_posts(
        &self,
        post_ids: &[Uuid],
        per_post: i64,
    ) -> Result<Vec<PostLikeWithUser>>;

    /// Like totals for the given posts.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;
}

/// Repository for PostLike operations
#[derive(Clone)]
pub struct PostLikeRepository {
    pool: PgPool,
}

impl PostLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostLikeStore for PostLikeRepository {
    async fn toggle(&self, user_id: Uuid, post_id: Uuid) -> Result<ToggleOutcome<PostLike>> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(ToggleOutcome::Removed);
        }

        // ON CONFLICT keeps the flip well-defined when a concurrent toggle
        // wins the insert race: the pair still holds at most one like.
        let like = sqlx::query_as::<_, PostLike>(
            r#"
            INSERT INTO post_likes (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO UPDATE
            SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, post_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ToggleOutcome::Added(like))
    }

    async fn has_user_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM post_likes
                WHERE user_id = $1 AND post_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_by_post(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostLikeWithUser>> {
        let rows = sqlx::query_as::<_, PostLikeUserRow>(
            r#"
            SELECT pl.id, pl.post_id, pl.created_at,
                   u.id AS liker_id, u.name AS liker_name,
                   u.username AS liker_username, u.image AS liker_image
            FROM post_likes pl
            LEFT JOIN users u ON u.id = pl.user_id
            WHERE pl.post_id = $1
            ORDER BY pl.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_by_posts(
        &self,
        post_ids: &[Uuid],
        per_post: i64,
    ) -> Result<Vec<PostLikeWithUser>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostLikeUserRow>(
            r#"
            SELECT id, post_id, created_at, liker_id, liker_name, liker_username, liker_image
            FROM (
                SELECT pl.id, pl.post_id, pl.created_at,
                       u.id AS liker_id, u.name AS liker_name,
                       u.username AS liker_username, u.image AS liker_image,
                       ROW_NUMBER() OVER (
                           PARTITION BY pl.post_id ORDER BY pl.created_at DESC
                       ) AS rn
                FROM post_likes pl
                LEFT JOIN users u ON u.id = pl.user_id
                WHERE pl.post_id = ANY($1)
            ) ranked
            WHERE rn <= $2
            ORDER BY post_id, created_at DESC
            "#,
        )
        .bind(post_ids)
        .bind(per_post)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT post_id, COUNT(*)
            FROM post_likes
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
