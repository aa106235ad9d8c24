use crate::error::Result;
use crate::models::{Comment, CommentWithAuthor, UserPreview};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "id, post_id, user_id, parent_comment_id, content, created_at, updated_at";

/// Flat row for comment queries joined against the author preview.
/// The LEFT JOIN leaves the author columns NULL when the user is gone.
#[derive(sqlx::FromRow)]
struct CommentAuthorRow {
    id: Uuid,
    post_id: Uuid,
    parent_comment_id: Option<Uuid>,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Option<Uuid>,
    author_name: Option<String>,
    author_username: Option<String>,
    author_image: Option<String>,
}

impl From<CommentAuthorRow> for CommentWithAuthor {
    fn from(row: CommentAuthorRow) -> Self {
        let user = match (row.author_id, row.author_name, row.author_username) {
            (Some(id), Some(name), Some(username)) => Some(UserPreview {
                id,
                name,
                username,
                image: row.author_image,
            }),
            _ => None,
        };

        CommentWithAuthor {
            id: row.id,
            post_id: row.post_id,
            parent_comment_id: row.parent_comment_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user,
        }
    }
}

/// Store owning the `comments` table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Creates a comment. `parent_comment_id = None` means top-level; replies
    /// pass the parent's post id, never a caller-supplied one.
    async fn create(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
        parent_comment_id: Option<Uuid>,
    ) -> Result<Comment>;

    async fn find_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    async fn update_content(&self, comment_id: Uuid, content: &str) -> Result<Comment>;

    /// Top-level comments of a post, newest first, with author previews.
    async fn list_top_level(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>>;

    /// Direct replies of a comment, newest first, with author previews.
    async fn list_replies(&self, parent_comment_id: Uuid) -> Result<Vec<CommentWithAuthor>>;

    /// Up to `per_post` newest comments for each of the given posts.
    async fn recent_by_posts(
        &self,
        post_ids: &[Uuid],
        per_post: i64,
    ) -> Result<Vec<CommentWithAuthor>>;

    /// Comment totals (replies included) for the given posts.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;

    /// Deletes the comment and everything hanging off it, in one transaction:
    /// its likes, its replies' likes, its replies, the comment.
    async fn delete_cascade(&self, comment_id: Uuid) -> Result<()>;
}

/// Repository for Comment operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn create(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
        parent_comment_id: Option<Uuid>,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (post_id, user_id, content, parent_comment_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .bind(parent_comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1",
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update_content(&self, comment_id: Uuid, content: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(comment_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_top_level(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(
            r#"
            SELECT c.id, c.post_id, c.parent_comment_id, c.content, c.created_at, c.updated_at,
                   u.id AS author_id, u.name AS author_name,
                   u.username AS author_username, u.image AS author_image
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1 AND c.parent_comment_id IS NULL
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_replies(&self, parent_comment_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(
            r#"
            SELECT c.id, c.post_id, c.parent_comment_id, c.content, c.created_at, c.updated_at,
                   u.id AS author_id, u.name AS author_name,
                   u.username AS author_username, u.image AS author_image
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.parent_comment_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(parent_comment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_by_posts(
        &self,
        post_ids: &[Uuid],
        per_post: i64,
    ) -> Result<Vec<CommentWithAuthor>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CommentAuthorRow>(
            r#"
            SELECT id, post_id, parent_comment_id, content, created_at, updated_at,
                   author_id, author_name, author_username, author_image
            FROM (
                SELECT c.id, c.post_id, c.parent_comment_id, c.content,
                       c.created_at, c.updated_at,
                       u.id AS author_id, u.name AS author_name,
                       u.username AS author_username, u.image AS author_image,
                       ROW_NUMBER() OVER (
                           PARTITION BY c.post_id ORDER BY c.created_at DESC
                       ) AS rn
                FROM comments c
                LEFT JOIN users u ON u.id = c.user_id
                WHERE c.post_id = ANY($1)
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
            FROM comments
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn delete_cascade(&self, comment_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM comment_likes
            WHERE comment_id IN (SELECT id FROM comments WHERE parent_comment_id = $1)
            "#,
        )
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM comments WHERE parent_comment_id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
