/// Data models for pulse-social
///
/// Entities map 1:1 onto tables (`sqlx::FromRow`); the *WithUser / *WithAuthor
/// types are denormalized read models produced by joined queries, and
/// `FeedPost` is the fully enriched aggregate the feed endpoints return.
/// Everything serializes camelCase for the API surface.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of images a post may hold.
pub const MAX_POST_IMAGES: usize = 10;

/// User entity - owned by the identity collaborator, read-only here
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight author/liker preview embedded in denormalized responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserPreview {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub image: Option<String>,
}

/// Post entity - content plus an ordered image reference list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment entity - top-level when `parent_comment_id` is None, reply otherwise
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PostLike entity - at most one per (user, post)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostLike {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// CommentLike entity - carries the comment's post id for cascade efficiency
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentLike {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub comment_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post like with its liker preview (absent liker tolerated)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLikeWithUser {
    pub id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserPreview>,
}

/// Comment like with its liker preview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeWithUser {
    pub id: Uuid,
    pub post_id: Uuid,
    pub comment_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserPreview>,
}

/// Comment with its author preview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserPreview>,
}

/// Fully enriched post as returned by the feed endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserPreview>,
    pub likes: Vec<PostLikeWithUser>,
    pub comments: Vec<CommentWithAuthor>,
    pub total_likes: i64,
    pub total_comments: i64,
}

/// Outcome of a like toggle
#[derive(Debug, Clone)]
pub enum ToggleOutcome<T> {
    Added(T),
    Removed,
}

/// 1-indexed pagination query parameters, defaulting to page=1, limit=20
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PaginationQuery {
    /// Returns (page, limit, offset) with page/limit floored at 1.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.max(1);
        let limit = self.limit.max(1);
        (page, limit, (page - 1) * limit)
    }
}

/// Pagination envelope shared by every listing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    pub fn new(total_count: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_count + limit - 1) / limit
        } else {
            0
        };
        Self {
            total_count,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// A page of enriched posts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsPage {
    pub posts: Vec<FeedPost>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

/// A page of likes (post or comment targets)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesPage<T> {
    pub likes: Vec<T>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}
