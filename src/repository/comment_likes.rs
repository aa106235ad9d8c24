use crate::error::Result;
use crate::models::{CommentLike, CommentLikeWithUser, ToggleOutcome, UserPreview};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct CommentLikeUserRow {
    id: Uuid,
    post_id: Uuid,
    comment_id: Uuid,
    created_at: DateTime<Utc>,
    liker_id: Option<Uuid>,
    liker_name: Option<String>,
    liker_username: Option<String>,
    liker_image: Option<String>,
}

impl From<CommentLikeUserRow> for CommentLikeWithUser {
    fn from(row: CommentLikeUserRow) -> Self {
        let user = match (row.liker_id, row.liker_name, row.liker_username) {
            (Some(id), Some(name), Some(username)) => Some(UserPreview {
                id,
                name,
                username,
                image: row.liker_image,
            }),
            _ => None,
        };

        CommentLikeWithUser {
            id: row.id,
            post_id: row.post_id,
            comment_id: row.comment_id,
            created_at: row.created_at,
            user,
        }
    }
}

/// Store owning the `comment_likes` table.
///
/// Rows carry the comment's post id so post deletion can purge them without
/// a join; `(user_id, comment_id)` is unique at the storage layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentLikeStore: Send + Sync {
    /// `post_id` is the liked comment's post, supplied by the service from
    /// the fetched comment - never by the caller.
    async fn toggle(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome<CommentLike>>;

    async fn has_user_liked(&self, user_id: Uuid, comment_id: Uuid) -> Result<bool>;

    async fn count_by_comment(&self, comment_id: Uuid) -> Result<i64>;

    /// Likes of a comment, newest first, with liker previews.
    async fn list_by_comment(
        &self,
        comment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentLikeWithUser>>;
}

/// Repository for CommentLike operations
#[derive(Clone)]
pub struct CommentLikeRepository {
    pool: PgPool,
}

impl CommentLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentLikeStore for CommentLikeRepository {
    async fn toggle(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome<CommentLike>> {
        let mut tx = self.pool.begin().await?;

        let removed =
            sqlx::query("DELETE FROM comment_likes WHERE user_id = $1 AND comment_id = $2")
                .bind(user_id)
                .bind(comment_id)
                .execute(&mut *tx)
                .await?;

        if removed.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(ToggleOutcome::Removed);
        }

        let like = sqlx::query_as::<_, CommentLike>(
            r#"
            INSERT INTO comment_likes (user_id, comment_id, post_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, comment_id) DO UPDATE
            SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, post_id, comment_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(comment_id)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ToggleOutcome::Added(like))
    }

    async fn has_user_liked(&self, user_id: Uuid, comment_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM comment_likes
                WHERE user_id = $1 AND comment_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_by_comment(&self, comment_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn list_by_comment(
        &self,
        comment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentLikeWithUser>> {
        let rows = sqlx::query_as::<_, CommentLikeUserRow>(
            r#"
            SELECT cl.id, cl.post_id, cl.comment_id, cl.created_at,
                   u.id AS liker_id, u.name AS liker_name,
                   u.username AS liker_username, u.image AS liker_image
            FROM comment_likes cl
            LEFT JOIN users u ON u.id = cl.user_id
            WHERE cl.comment_id = $1
            ORDER BY cl.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(comment_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
