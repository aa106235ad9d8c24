/// Comment service - comment tree with one reply level, cascade on delete
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Comment, CommentWithAuthor};
use crate::repository::{CommentStore, PostStore};
use std::sync::Arc;
use uuid::Uuid;

pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    posts: Arc<dyn PostStore>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { comments, posts }
    }

    /// Get a comment by id
    pub async fn get(&self, comment_id: Uuid) -> Result<Comment> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    async fn require_post(&self, post_id: Uuid) -> Result<()> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        Ok(())
    }

    /// Create a top-level comment on an existing post
    pub async fn create_top_level(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        self.require_post(post_id).await?;

        let comment = self.comments.create(post_id, user_id, content, None).await?;

        metrics::CONTENT_OPS_TOTAL
            .with_label_values(&["comment", "created"])
            .inc();

        Ok(comment)
    }

    /// Create a reply under an existing comment.
    ///
    /// The reply's post is inherited from the parent, never supplied by the
    /// caller. Replying to a reply attaches the new comment as a sibling
    /// under the same top-level parent, so the tree never grows past one
    /// level and the delete cascade always sees every descendant.
    pub async fn create_reply(
        &self,
        user_id: Uuid,
        parent_comment_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let parent = self.get(parent_comment_id).await?;
        let anchor_id = parent.parent_comment_id.unwrap_or(parent.id);

        let reply = self
            .comments
            .create(parent.post_id, user_id, content, Some(anchor_id))
            .await?;

        metrics::CONTENT_OPS_TOTAL
            .with_label_values(&["comment", "created"])
            .inc();

        Ok(reply)
    }

    /// Replace the comment content (author only)
    pub async fn edit(&self, user_id: Uuid, comment_id: Uuid, content: &str) -> Result<Comment> {
        let comment = self.get(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "User is not authorized to edit this comment".to_string(),
            ));
        }

        self.comments.update_content(comment_id, content).await
    }

    /// Top-level comments of a post, newest first, with author previews
    pub async fn list_top_level(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        self.require_post(post_id).await?;
        self.comments.list_top_level(post_id).await
    }

    /// Direct replies of a comment, newest first, with author previews
    pub async fn list_replies(&self, comment_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        self.get(comment_id).await?;
        self.comments.list_replies(comment_id).await
    }

    /// Delete the comment (author only, not post-owner), cascading into its
    /// likes, its replies' likes, and its replies. Returns the pre-deletion
    /// snapshot.
    pub async fn delete(&self, user_id: Uuid, comment_id: Uuid) -> Result<Comment> {
        let comment = self.get(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "User not authorized to delete this comment".to_string(),
            ));
        }

        self.comments.delete_cascade(comment_id).await?;

        metrics::CONTENT_OPS_TOTAL
            .with_label_values(&["comment", "deleted"])
            .inc();

        Ok(comment)
    }
}
