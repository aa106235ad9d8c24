/// Feed service - paginated denormalized post pages
///
/// Enrichment is batched: one query per related collection per page, merged
/// here in application code, so a page never degenerates into per-post
/// lookups.
use crate::error::{AppError, Result};
use crate::models::{
    CommentWithAuthor, FeedPost, PageInfo, PaginationQuery, Post, PostLikeWithUser, PostsPage,
};
use crate::repository::{CommentStore, IdentityStore, PostLikeStore, PostStore};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Like preview length on feed pages.
pub const FEED_LIKES_PREVIEW: i64 = 3;
/// Comment preview length on feed pages.
pub const FEED_COMMENTS_PREVIEW: i64 = 2;
/// Like preview length on the single-post view.
pub const POST_DETAIL_LIKES_PREVIEW: i64 = 3;
/// Comment preview length on the single-post view.
pub const POST_DETAIL_COMMENTS_PREVIEW: i64 = 3;

pub struct FeedService {
    posts: Arc<dyn PostStore>,
    users: Arc<dyn IdentityStore>,
    comments: Arc<dyn CommentStore>,
    post_likes: Arc<dyn PostLikeStore>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        users: Arc<dyn IdentityStore>,
        comments: Arc<dyn CommentStore>,
        post_likes: Arc<dyn PostLikeStore>,
    ) -> Self {
        Self {
            posts,
            users,
            comments,
            post_likes,
        }
    }

    /// All posts, newest first, enriched
    pub async fn list_all(&self, query: PaginationQuery) -> Result<PostsPage> {
        let (page, limit, offset) = query.normalize();

        let posts = self.posts.list_page(limit, offset).await?;
        let total = self.posts.count_all().await?;
        let posts = self
            .enrich(posts, FEED_LIKES_PREVIEW, FEED_COMMENTS_PREVIEW)
            .await?;

        Ok(PostsPage {
            posts,
            page_info: PageInfo::new(total, page, limit),
        })
    }

    /// One author's posts, newest first, enriched
    pub async fn list_by_user(&self, user_id: Uuid, query: PaginationQuery) -> Result<PostsPage> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let (page, limit, offset) = query.normalize();

        let posts = self.posts.list_by_user_page(user_id, limit, offset).await?;
        let total = self.posts.count_by_user(user_id).await?;
        let posts = self
            .enrich(posts, FEED_LIKES_PREVIEW, FEED_COMMENTS_PREVIEW)
            .await?;

        Ok(PostsPage {
            posts,
            page_info: PageInfo::new(total, page, limit),
        })
    }

    /// A single enriched post
    pub async fn get_one(&self, post_id: Uuid) -> Result<FeedPost> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let mut enriched = self
            .enrich(
                vec![post],
                POST_DETAIL_LIKES_PREVIEW,
                POST_DETAIL_COMMENTS_PREVIEW,
            )
            .await?;

        enriched
            .pop()
            .ok_or_else(|| AppError::Internal("enrichment dropped the post".to_string()))
    }

    async fn enrich(
        &self,
        posts: Vec<Post>,
        likes_preview: i64,
        comments_preview: i64,
    ) -> Result<Vec<FeedPost>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let author_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors = self.users.previews_by_ids(&author_ids).await?;

        let mut likes_by_post: HashMap<Uuid, Vec<PostLikeWithUser>> = HashMap::new();
        for like in self
            .post_likes
            .recent_by_posts(&post_ids, likes_preview)
            .await?
        {
            likes_by_post.entry(like.post_id).or_default().push(like);
        }
        let like_counts = self.post_likes.count_by_posts(&post_ids).await?;

        let mut comments_by_post: HashMap<Uuid, Vec<CommentWithAuthor>> = HashMap::new();
        for comment in self
            .comments
            .recent_by_posts(&post_ids, comments_preview)
            .await?
        {
            comments_by_post
                .entry(comment.post_id)
                .or_default()
                .push(comment);
        }
        let comment_counts = self.comments.count_by_posts(&post_ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| FeedPost {
                user: authors.get(&post.user_id).cloned(),
                likes: likes_by_post.remove(&post.id).unwrap_or_default(),
                comments: comments_by_post.remove(&post.id).unwrap_or_default(),
                total_likes: like_counts.get(&post.id).copied().unwrap_or(0),
                total_comments: comment_counts.get(&post.id).copied().unwrap_or(0),
                id: post.id,
                user_id: post.user_id,
                content: post.content,
                images: post.images,
                created_at: post.created_at,
                updated_at: post.updated_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserPreview};
    use crate::repository::{
        MockCommentStore, MockIdentityStore, MockPostLikeStore, MockPostStore,
    };
    use chrono::Utc;

    fn sample_post(user_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id,
            content: "Hello world, this is post one".to_string(),
            images: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_user(id: Uuid) -> User {
        User {
            id,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            country: None,
            gender: None,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn like_for(post_id: Uuid) -> PostLikeWithUser {
        PostLikeWithUser {
            id: Uuid::new_v4(),
            post_id,
            created_at: Utc::now(),
            user: Some(UserPreview {
                id: Uuid::new_v4(),
                name: "Liker".to_string(),
                username: "liker".to_string(),
                image: None,
            }),
        }
    }

    fn comment_for(post_id: Uuid) -> CommentWithAuthor {
        CommentWithAuthor {
            id: Uuid::new_v4(),
            post_id,
            parent_comment_id: None,
            content: "First comment here!!".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user: None,
        }
    }

    fn quiet_enrichment_mocks() -> (MockIdentityStore, MockCommentStore, MockPostLikeStore) {
        let mut users = MockIdentityStore::new();
        users
            .expect_previews_by_ids()
            .returning(|_| Ok(HashMap::new()));

        let mut comments = MockCommentStore::new();
        comments.expect_recent_by_posts().returning(|_, _| Ok(vec![]));
        comments
            .expect_count_by_posts()
            .returning(|_| Ok(HashMap::new()));

        let mut post_likes = MockPostLikeStore::new();
        post_likes
            .expect_recent_by_posts()
            .returning(|_, _| Ok(vec![]));
        post_likes
            .expect_count_by_posts()
            .returning(|_| Ok(HashMap::new()));

        (users, comments, post_likes)
    }

    fn service(
        posts: MockPostStore,
        users: MockIdentityStore,
        comments: MockCommentStore,
        post_likes: MockPostLikeStore,
    ) -> FeedService {
        FeedService::new(
            Arc::new(posts),
            Arc::new(users),
            Arc::new(comments),
            Arc::new(post_likes),
        )
    }

    #[tokio::test]
    async fn pagination_over_twelve_posts() {
        // page 2 of 12 posts at limit 5 -> 5 items, 3 pages, both flags set
        let mut posts = MockPostStore::new();
        posts
            .expect_list_page()
            .withf(|limit, offset| *limit == 5 && *offset == 5)
            .returning(|_, _| Ok((0..5).map(|_| sample_post(Uuid::new_v4())).collect()));
        posts.expect_count_all().returning(|| Ok(12));

        let (users, comments, post_likes) = quiet_enrichment_mocks();
        let svc = service(posts, users, comments, post_likes);

        let page = svc
            .list_all(PaginationQuery { page: 2, limit: 5 })
            .await
            .unwrap();

        assert_eq!(page.posts.len(), 5);
        assert_eq!(page.page_info.total_pages, 3);
        assert!(page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn last_page_has_no_next() {
        let mut posts = MockPostStore::new();
        posts
            .expect_list_page()
            .withf(|limit, offset| *limit == 5 && *offset == 10)
            .returning(|_, _| Ok((0..2).map(|_| sample_post(Uuid::new_v4())).collect()));
        posts.expect_count_all().returning(|| Ok(12));

        let (users, comments, post_likes) = quiet_enrichment_mocks();
        let svc = service(posts, users, comments, post_likes);

        let page = svc
            .list_all(PaginationQuery { page: 3, limit: 5 })
            .await
            .unwrap();

        assert_eq!(page.posts.len(), 2);
        assert!(!page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn feed_previews_are_truncated_but_totals_are_not() {
        let author = Uuid::new_v4();
        let post = sample_post(author);
        let post_id = post.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_list_page()
            .returning(move |_, _| Ok(vec![post.clone()]));
        posts.expect_count_all().returning(|| Ok(1));

        let mut users = MockIdentityStore::new();
        users.expect_previews_by_ids().returning(|ids| {
            Ok(ids
                .iter()
                .map(|id| {
                    (
                        *id,
                        UserPreview {
                            id: *id,
                            name: "Ada".to_string(),
                            username: "ada".to_string(),
                            image: None,
                        },
                    )
                })
                .collect())
        });

        // the stores truncate to the preview length; totals cover everything
        let mut post_likes = MockPostLikeStore::new();
        post_likes
            .expect_recent_by_posts()
            .withf(|_, per_post| *per_post == FEED_LIKES_PREVIEW)
            .returning(move |_, _| Ok((0..3).map(|_| like_for(post_id)).collect()));
        post_likes
            .expect_count_by_posts()
            .returning(move |_| Ok(HashMap::from([(post_id, 40)])));

        let mut comments = MockCommentStore::new();
        comments
            .expect_recent_by_posts()
            .withf(|_, per_post| *per_post == FEED_COMMENTS_PREVIEW)
            .returning(move |_, _| Ok((0..2).map(|_| comment_for(post_id)).collect()));
        comments
            .expect_count_by_posts()
            .returning(move |_| Ok(HashMap::from([(post_id, 25)])));

        let svc = service(posts, users, comments, post_likes);
        let page = svc.list_all(PaginationQuery::default()).await.unwrap();

        let feed_post = &page.posts[0];
        assert_eq!(feed_post.likes.len(), 3);
        assert_eq!(feed_post.comments.len(), 2);
        assert_eq!(feed_post.total_likes, 40);
        assert_eq!(feed_post.total_comments, 25);
        assert_eq!(feed_post.user.as_ref().unwrap().username, "ada");
    }

    #[tokio::test]
    async fn missing_author_leaves_preview_empty() {
        let mut posts = MockPostStore::new();
        posts
            .expect_list_page()
            .returning(|_, _| Ok(vec![sample_post(Uuid::new_v4())]));
        posts.expect_count_all().returning(|| Ok(1));

        let (users, comments, post_likes) = quiet_enrichment_mocks();
        let svc = service(posts, users, comments, post_likes);

        let page = svc.list_all(PaginationQuery::default()).await.unwrap();
        assert!(page.posts[0].user.is_none());
    }

    #[tokio::test]
    async fn list_by_user_requires_existing_user() {
        let mut users = MockIdentityStore::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(
            MockPostStore::new(),
            users,
            MockCommentStore::new(),
            MockPostLikeStore::new(),
        );

        let err = svc
            .list_by_user(Uuid::new_v4(), PaginationQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_by_user_counts_only_that_author() {
        let author = Uuid::new_v4();

        let mut users = MockIdentityStore::new();
        let known = sample_user(author);
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(known.clone())));
        users
            .expect_previews_by_ids()
            .returning(|_| Ok(HashMap::new()));

        let mut posts = MockPostStore::new();
        posts
            .expect_list_by_user_page()
            .withf(move |id, limit, offset| *id == author && *limit == 20 && *offset == 0)
            .returning(move |id, _, _| Ok(vec![sample_post(id)]));
        posts
            .expect_count_by_user()
            .withf(move |id| *id == author)
            .returning(|_| Ok(1));

        let mut comments = MockCommentStore::new();
        comments.expect_recent_by_posts().returning(|_, _| Ok(vec![]));
        comments
            .expect_count_by_posts()
            .returning(|_| Ok(HashMap::new()));

        let mut post_likes = MockPostLikeStore::new();
        post_likes
            .expect_recent_by_posts()
            .returning(|_, _| Ok(vec![]));
        post_likes
            .expect_count_by_posts()
            .returning(|_| Ok(HashMap::new()));

        let svc = service(posts, users, comments, post_likes);
        let page = svc
            .list_by_user(author, PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(page.page_info.total_count, 1);
        assert_eq!(page.posts.len(), 1);
    }

    #[tokio::test]
    async fn get_one_uses_detail_preview_lengths() {
        let post = sample_post(Uuid::new_v4());
        let post_id = post.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let mut users = MockIdentityStore::new();
        users
            .expect_previews_by_ids()
            .returning(|_| Ok(HashMap::new()));

        let mut post_likes = MockPostLikeStore::new();
        post_likes
            .expect_recent_by_posts()
            .withf(|_, per_post| *per_post == POST_DETAIL_LIKES_PREVIEW)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        post_likes
            .expect_count_by_posts()
            .returning(|_| Ok(HashMap::new()));

        let mut comments = MockCommentStore::new();
        comments
            .expect_recent_by_posts()
            .withf(|_, per_post| *per_post == POST_DETAIL_COMMENTS_PREVIEW)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        comments
            .expect_count_by_posts()
            .returning(|_| Ok(HashMap::new()));

        let svc = service(posts, users, comments, post_likes);
        let feed_post = svc.get_one(post_id).await.unwrap();

        assert_eq!(feed_post.id, post_id);
        assert_eq!(feed_post.total_likes, 0);
    }
}
