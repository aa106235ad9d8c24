/// Post handlers - HTTP endpoints for post operations and feed views
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::PaginationQuery;
use crate::services::{FeedService, PostService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a post. `images` are references the upload
/// collaborator already persisted.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 8))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub images: Vec<String>,
}

/// Request body for replacing post content
#[derive(Debug, Deserialize, Validate)]
pub struct EditPostContentRequest {
    #[validate(length(min = 8))]
    pub content: String,
}

/// Request body naming staged or stored image references
#[derive(Debug, Deserialize)]
pub struct PostImagesRequest {
    pub images: Vec<String>,
}

/// Create a new post
pub async fn create_post(
    service: web::Data<PostService>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let req = req.into_inner();

    let post = service.create(user_id.0, &req.content, req.images).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Post created successfully",
        "post": post,
    })))
}

/// Get all posts, enriched and paginated
pub async fn get_all_posts(
    feed: web::Data<FeedService>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let page = feed.list_all(*query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Get the caller's own posts
pub async fn get_my_posts(
    feed: web::Data<FeedService>,
    user_id: UserId,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let page = feed.list_by_user(user_id.0, *query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Get one user's posts
pub async fn get_user_posts(
    feed: web::Data<FeedService>,
    user_id: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let page = feed.list_by_user(*user_id, *query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Get a single enriched post
pub async fn get_post(
    feed: web::Data<FeedService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = feed.get_one(*post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Replace post content
pub async fn edit_post_content(
    service: web::Data<PostService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<EditPostContentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let post = service
        .edit_content(user_id.0, *post_id, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post content updated successfully",
        "post": post,
    })))
}

/// Append staged images to a post (cap is exclusive at MAX_POST_IMAGES)
pub async fn add_post_images(
    service: web::Data<PostService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<PostImagesRequest>,
) -> Result<HttpResponse> {
    let post = service
        .add_images(user_id.0, *post_id, req.into_inner().images)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Images added to post successfully",
        "post": post,
    })))
}

/// Remove listed image references from a post
pub async fn delete_post_images(
    service: web::Data<PostService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<PostImagesRequest>,
) -> Result<HttpResponse> {
    let post = service
        .delete_images(user_id.0, *post_id, req.into_inner().images)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Images removed successfully",
        "post": post,
    })))
}

/// Delete a post and everything hanging off it
pub async fn delete_post(
    service: web::Data<PostService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let deleted = service.delete(user_id.0, *post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post deleted successfully",
        "deletedPost": deleted,
    })))
}
