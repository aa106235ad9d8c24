/// Comment handlers - HTTP endpoints for comment operations
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating or editing a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CommentContentRequest {
    #[validate(length(min = 8, max = 200))]
    pub content: String,
}

/// Create a top-level comment on a post
pub async fn create_comment(
    service: web::Data<CommentService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentContentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let comment = service
        .create_top_level(user_id.0, *post_id, req.content.trim())
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Comment added",
        "comment": comment,
    })))
}

/// Create a reply under a comment; the reply's post comes from the parent
pub async fn create_reply(
    service: web::Data<CommentService>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
    req: web::Json<CommentContentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let reply = service
        .create_reply(user_id.0, *comment_id, req.content.trim())
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Reply added to comment",
        "reply": reply,
    })))
}

/// Top-level comments of a post, newest first
pub async fn get_post_comments(
    service: web::Data<CommentService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = service.list_top_level(*post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "comments": comments })))
}

/// Direct replies of a comment, newest first
pub async fn get_comment_replies(
    service: web::Data<CommentService>,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let replies = service.list_replies(*comment_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "replies": replies })))
}

/// Replace comment content (author only)
pub async fn edit_comment(
    service: web::Data<CommentService>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
    req: web::Json<CommentContentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let comment = service
        .edit(user_id.0, *comment_id, req.content.trim())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment updated",
        "updatedComment": comment,
    })))
}

/// Delete a comment and its replies (author only)
pub async fn delete_comment(
    service: web::Data<CommentService>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let deleted = service.delete(user_id.0, *comment_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment and associated replies deleted",
        "deletedComment": deleted,
    })))
}
