/// Like handlers - HTTP endpoints for like toggles, counts, and listings
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{PaginationQuery, ToggleOutcome};
use crate::services::LikeService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Toggle the caller's like on a post
pub async fn toggle_post_like(
    service: web::Data<LikeService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let body = match service.toggle_post_like(user_id.0, *post_id).await? {
        ToggleOutcome::Added(like) => serde_json::json!({
            "message": "Like added to post",
            "like": like,
        }),
        ToggleOutcome::Removed => serde_json::json!({
            "message": "Like removed from post",
        }),
    };

    Ok(HttpResponse::Ok().json(body))
}

/// Total likes of a post
pub async fn get_post_likes_count(
    service: web::Data<LikeService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let count = service.post_likes_count(*post_id).await?;
    Ok(HttpResponse::Ok().json(count))
}

/// Paginated likes of a post with liker previews
pub async fn get_post_likes(
    service: web::Data<LikeService>,
    post_id: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let page = service.list_post_likes(*post_id, *query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Toggle the caller's like on a comment
pub async fn toggle_comment_like(
    service: web::Data<LikeService>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let body = match service.toggle_comment_like(user_id.0, *comment_id).await? {
        ToggleOutcome::Added(like) => serde_json::json!({
            "message": "Like added to comment",
            "commentLike": like,
        }),
        ToggleOutcome::Removed => serde_json::json!({
            "message": "Like removed from comment",
        }),
    };

    Ok(HttpResponse::Ok().json(body))
}

/// Total likes of a comment
pub async fn get_comment_likes_count(
    service: web::Data<LikeService>,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let count = service.comment_likes_count(*comment_id).await?;
    Ok(HttpResponse::Ok().json(count))
}

/// Paginated likes of a comment with liker previews
pub async fn get_comment_likes(
    service: web::Data<LikeService>,
    comment_id: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let page = service.list_comment_likes(*comment_id, *query).await?;
    Ok(HttpResponse::Ok().json(page))
}
