use crate::error::Result;
use crate::models::Post;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const POST_COLUMNS: &str = "id, user_id, content, images, created_at, updated_at";

/// Store owning the `posts` table.
///
/// `delete_cascade` is the only place dependent likes/comments may be removed
/// on behalf of a post.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, user_id: Uuid, content: &str, images: &[String]) -> Result<Post>;

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>>;

    async fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<Post>>;

    async fn list_by_user_page(&self, user_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Post>>;

    async fn count_all(&self) -> Result<i64>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64>;

    async fn update_content(&self, post_id: Uuid, content: &str) -> Result<Post>;

    /// Replaces the whole image list. Callers compute the new list so the
    /// add/remove semantics live in one place (the service).
    async fn set_images(&self, post_id: Uuid, images: &[String]) -> Result<Post>;

    /// Deletes the post and everything hanging off it, in one transaction:
    /// post likes, comment likes of the post, comments of the post, the post.
    async fn delete_cascade(&self, post_id: Uuid) -> Result<()>;
}

/// Repository for Post operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn create(&self, user_id: Uuid, content: &str, images: &[String]) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (user_id, content, images)
            VALUES ($1, $2, $3)
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(content)
        .bind(images)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1",
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn list_by_user_page(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count_all(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update_content(&self, post_id: Uuid, content: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(post_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn set_images(&self, post_id: Uuid, images: &[String]) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET images = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(post_id)
        .bind(images)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_cascade(&self, post_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        // comment_likes carry the post id precisely so this purge does not
        // need a join against comments
        sqlx::query("DELETE FROM comment_likes WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
