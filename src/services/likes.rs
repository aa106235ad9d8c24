/// Like service - idempotent toggles, counts, and like listings for both
/// target kinds (post, comment)
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    CommentLike, CommentLikeWithUser, LikesPage, PageInfo, PaginationQuery, PostLike,
    PostLikeWithUser, ToggleOutcome,
};
use crate::repository::{CommentLikeStore, CommentStore, PostLikeStore, PostStore};
use std::sync::Arc;
use uuid::Uuid;

pub struct LikeService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    post_likes: Arc<dyn PostLikeStore>,
    comment_likes: Arc<dyn CommentLikeStore>,
}

impl LikeService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        post_likes: Arc<dyn PostLikeStore>,
        comment_likes: Arc<dyn CommentLikeStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            post_likes,
            comment_likes,
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<()> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        Ok(())
    }

    /// Flip the caller's like on a post
    pub async fn toggle_post_like(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome<PostLike>> {
        self.require_post(post_id).await?;

        let outcome = self.post_likes.toggle(user_id, post_id).await?;
        let label = match &outcome {
            ToggleOutcome::Added(_) => "added",
            ToggleOutcome::Removed => "removed",
        };
        metrics::LIKE_TOGGLES_TOTAL
            .with_label_values(&["post", label])
            .inc();

        Ok(outcome)
    }

    /// Total likes of a post
    pub async fn post_likes_count(&self, post_id: Uuid) -> Result<i64> {
        self.require_post(post_id).await?;
        self.post_likes.count_by_post(post_id).await
    }

    /// Paginated likes of a post, newest first, with liker previews
    pub async fn list_post_likes(
        &self,
        post_id: Uuid,
        query: PaginationQuery,
    ) -> Result<LikesPage<PostLikeWithUser>> {
        self.require_post(post_id).await?;

        let (page, limit, offset) = query.normalize();
        let likes = self.post_likes.list_by_post(post_id, limit, offset).await?;
        let total = self.post_likes.count_by_post(post_id).await?;

        Ok(LikesPage {
            likes,
            page_info: PageInfo::new(total, page, limit),
        })
    }

    /// Flip the caller's like on a comment.
    ///
    /// The like row inherits the comment's post id for cascade efficiency.
    pub async fn toggle_comment_like(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
    ) -> Result<ToggleOutcome<CommentLike>> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        let outcome = self
            .comment_likes
            .toggle(user_id, comment_id, comment.post_id)
            .await?;
        let label = match &outcome {
            ToggleOutcome::Added(_) => "added",
            ToggleOutcome::Removed => "removed",
        };
        metrics::LIKE_TOGGLES_TOTAL
            .with_label_values(&["comment", label])
            .inc();

        Ok(outcome)
    }

    /// Total likes of a comment
    pub async fn comment_likes_count(&self, comment_id: Uuid) -> Result<i64> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        self.comment_likes.count_by_comment(comment_id).await
    }

    /// Paginated likes of a comment, newest first, with liker previews
    pub async fn list_comment_likes(
        &self,
        comment_id: Uuid,
        query: PaginationQuery,
    ) -> Result<LikesPage<CommentLikeWithUser>> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        let (page, limit, offset) = query.normalize();
        let likes = self
            .comment_likes
            .list_by_comment(comment_id, limit, offset)
            .await?;
        let total = self.comment_likes.count_by_comment(comment_id).await?;

        Ok(LikesPage {
            likes,
            page_info: PageInfo::new(total, page, limit),
        })
    }
}
