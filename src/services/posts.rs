/// Post service - post lifecycle, image list mutations, cascade on delete
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Post, MAX_POST_IMAGES};
use crate::repository::PostStore;
use crate::storage::ImageStore;
use std::sync::Arc;
use uuid::Uuid;

pub struct PostService {
    posts: Arc<dyn PostStore>,
    images: Arc<dyn ImageStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { posts, images }
    }

    async fn require(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Deletes already-staged upload files after a failed mutation.
    async fn discard_staged(&self, references: &[String]) {
        for reference in references {
            self.images.remove(reference).await;
        }
    }

    /// Create a new post with zero or more staged image references
    pub async fn create(
        &self,
        user_id: Uuid,
        content: &str,
        images: Vec<String>,
    ) -> Result<Post> {
        if images.len() > MAX_POST_IMAGES {
            self.discard_staged(&images).await;
            return Err(AppError::BadRequest(format!(
                "You can upload maximum {MAX_POST_IMAGES} images to a post"
            )));
        }

        let post = match self.posts.create(user_id, content, &images).await {
            Ok(post) => post,
            Err(err) => {
                self.discard_staged(&images).await;
                return Err(err);
            }
        };

        metrics::CONTENT_OPS_TOTAL
            .with_label_values(&["post", "created"])
            .inc();

        Ok(post)
    }

    /// Replace the post content (owner only)
    pub async fn edit_content(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Post> {
        let post = self.require(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "User is not authorized to edit this post".to_string(),
            ));
        }

        self.posts.update_content(post_id, content).await
    }

    /// Append staged images to the post (owner only).
    ///
    /// The cap is exclusive: the combined count must stay strictly below
    /// MAX_POST_IMAGES. On any failure the staged files are deleted so no
    /// orphaned uploads survive.
    pub async fn add_images(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        new_images: Vec<String>,
    ) -> Result<Post> {
        let result = self.try_add_images(user_id, post_id, &new_images).await;
        if result.is_err() {
            self.discard_staged(&new_images).await;
        }
        result
    }

    async fn try_add_images(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        new_images: &[String],
    ) -> Result<Post> {
        let post = self.require(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "User is not authorized to edit this post".to_string(),
            ));
        }

        if new_images.is_empty() {
            return Err(AppError::BadRequest(
                "Please upload images to add".to_string(),
            ));
        }

        if post.images.len() + new_images.len() >= MAX_POST_IMAGES {
            return Err(AppError::BadRequest(format!(
                "You can upload maximum {MAX_POST_IMAGES} images to a post"
            )));
        }

        let mut images = post.images;
        images.extend_from_slice(new_images);
        self.posts.set_images(post_id, &images).await
    }

    /// Remove listed image references from the post (owner only).
    ///
    /// References not present on the post are silently ignored; each removed
    /// reference also has its stored file deleted.
    pub async fn delete_images(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        references: Vec<String>,
    ) -> Result<Post> {
        let post = self.require(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "User is not authorized to edit this post".to_string(),
            ));
        }

        let mut images = post.images;
        for reference in &references {
            if let Some(idx) = images.iter().position(|img| img == reference) {
                self.images.remove(&images[idx]).await;
                images.remove(idx);
            }
        }

        self.posts.set_images(post_id, &images).await
    }

    /// Delete the post (owner only), cascading into likes and comments.
    ///
    /// Returns the pre-deletion snapshot.
    pub async fn delete(&self, user_id: Uuid, post_id: Uuid) -> Result<Post> {
        let post = self.require(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "User not authorized to delete this post".to_string(),
            ));
        }

        for image in &post.images {
            self.images.remove(image).await;
        }

        self.posts.delete_cascade(post_id).await?;

        metrics::CONTENT_OPS_TOTAL
            .with_label_values(&["post", "deleted"])
            .inc();

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockPostStore;
    use crate::storage::MockImageStore;
    use chrono::Utc;

    fn sample_post(user_id: Uuid, images: Vec<String>) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id,
            content: "Hello world, this is post one".to_string(),
            images,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(posts: MockPostStore, images: MockImageStore) -> PostService {
        PostService::new(Arc::new(posts), Arc::new(images))
    }

    #[tokio::test]
    async fn edit_by_non_owner_is_forbidden() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let post = sample_post(owner, vec![]);
        let post_id = post.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let svc = service(posts, MockImageStore::new());
        let err = svc
            .edit_content(stranger, post_id, "rewritten content")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden_and_touches_nothing() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let post = sample_post(owner, vec!["uploads/postImages/a.png".to_string()]);
        let post_id = post.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        // no expect_delete_cascade, no expect_remove: any call would panic

        let svc = service(posts, MockImageStore::new());
        let err = svc.delete(stranger, post_id).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_cascades_once_and_removes_every_image_file() {
        let owner = Uuid::new_v4();
        let post = sample_post(
            owner,
            vec![
                "uploads/postImages/a.png".to_string(),
                "uploads/postImages/b.png".to_string(),
            ],
        );
        let post_id = post.id;
        let snapshot_id = post.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        posts
            .expect_delete_cascade()
            .times(1)
            .returning(|_| Ok(()));

        let mut images = MockImageStore::new();
        images.expect_remove().times(2).returning(|_| ());

        let svc = service(posts, images);
        let deleted = svc.delete(owner, post_id).await.unwrap();

        assert_eq!(deleted.id, snapshot_id);
    }

    #[tokio::test]
    async fn delete_missing_post_is_not_found() {
        let mut posts = MockPostStore::new();
        posts.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(posts, MockImageStore::new());
        let err = svc.delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_images_with_empty_list_is_bad_request() {
        let owner = Uuid::new_v4();
        let post = sample_post(owner, vec![]);
        let post_id = post.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let svc = service(posts, MockImageStore::new());
        let err = svc.add_images(owner, post_id, vec![]).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn image_cap_is_exclusive_at_the_boundary() {
        let owner = Uuid::new_v4();
        let nine: Vec<String> = (0..9)
            .map(|i| format!("uploads/postImages/{i}.png"))
            .collect();
        let post = sample_post(owner, nine);
        let post_id = post.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        // 9 + 1 = 10 reaches the cap and must be rejected; the staged file
        // gets cleaned up.
        let mut images = MockImageStore::new();
        images
            .expect_remove()
            .withf(|r| r == "uploads/postImages/new.png")
            .times(1)
            .returning(|_| ());

        let svc = service(posts, images);
        let err = svc
            .add_images(
                owner,
                post_id,
                vec!["uploads/postImages/new.png".to_string()],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn image_cap_accepts_eight_plus_one() {
        let owner = Uuid::new_v4();
        let eight: Vec<String> = (0..8)
            .map(|i| format!("uploads/postImages/{i}.png"))
            .collect();
        let post = sample_post(owner, eight.clone());
        let post_id = post.id;

        let mut expected = eight;
        expected.push("uploads/postImages/new.png".to_string());
        let returned = sample_post(owner, expected.clone());

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        posts
            .expect_set_images()
            .withf(move |_, imgs| imgs == expected.as_slice())
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let svc = service(posts, MockImageStore::new());
        let updated = svc
            .add_images(
                owner,
                post_id,
                vec!["uploads/postImages/new.png".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(updated.images.len(), 9);
    }

    #[tokio::test]
    async fn delete_images_ignores_unknown_references() {
        let owner = Uuid::new_v4();
        let post = sample_post(
            owner,
            vec![
                "uploads/postImages/keep.png".to_string(),
                "uploads/postImages/drop.png".to_string(),
            ],
        );
        let post_id = post.id;
        let remaining = sample_post(owner, vec!["uploads/postImages/keep.png".to_string()]);

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        posts
            .expect_set_images()
            .withf(|_, imgs| imgs == ["uploads/postImages/keep.png".to_string()].as_slice())
            .times(1)
            .returning(move |_, _| Ok(remaining.clone()));

        // only the present reference has its file removed
        let mut images = MockImageStore::new();
        images
            .expect_remove()
            .withf(|r| r == "uploads/postImages/drop.png")
            .times(1)
            .returning(|_| ());

        let svc = service(posts, images);
        let updated = svc
            .delete_images(
                owner,
                post_id,
                vec![
                    "uploads/postImages/drop.png".to_string(),
                    "uploads/postImages/not-on-post.png".to_string(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(updated.images, vec!["uploads/postImages/keep.png"]);
    }

    #[tokio::test]
    async fn create_succeeds_with_zero_images() {
        let owner = Uuid::new_v4();
        let created = sample_post(owner, vec![]);

        let mut posts = MockPostStore::new();
        posts
            .expect_create()
            .withf(|_, content, imgs| {
                content == "Hello world, this is post one" && imgs.is_empty()
            })
            .times(1)
            .returning(move |_, _, _| Ok(created.clone()));

        let svc = service(posts, MockImageStore::new());
        let post = svc
            .create(owner, "Hello world, this is post one", vec![])
            .await
            .unwrap();

        assert!(post.images.is_empty());
    }
}
