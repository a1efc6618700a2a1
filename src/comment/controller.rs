use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::comment::model::{CreateCommentRequest, CreatedComment, UpdateCommentRequest};
use crate::comment::service::CommentService;
use crate::middleware::auth::actor_from_request;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, respond};
use crate::utils::validation::require_text;

const MAX_COMMENT_LENGTH: usize = 1250;

/// Create a comment or a reply on a post
/// POST /api/posts/{post_id}/comments
///
/// Responds with the stored comment so clients can show it without re-reading.
pub async fn create_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let author = actor_from_request(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post ID")?;
    let content = require_text("Comment content", &body.content, MAX_COMMENT_LENGTH)?;
    let parent_comment_id = body
        .parent_comment_id
        .as_deref()
        .map(|raw| parse_object_id(raw, "parent comment ID"))
        .transpose()?;

    let comment = comment_service
        .add_comment(post_id, author, parent_comment_id, content)
        .await?;
    let view = comment_service.to_view(&comment, &author).await?;

    let created = CreatedComment {
        parent_comment_id: view.parent_comment_id.clone(),
        comment: view,
    };

    Ok(respond(
        StatusCode::CREATED,
        "Comment created successfully",
        json!(created),
    ))
}

/// Get the comment tree of a post
/// GET /api/posts/{post_id}/comments
pub async fn get_post_comments(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let viewer = actor_from_request(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post ID")?;

    let comments = comment_service.comment_tree(&post_id, &viewer).await?;

    Ok(respond(
        StatusCode::OK,
        "Comments retrieved successfully",
        json!({ "count": comments.len(), "comments": comments }),
    ))
}

/// Get a single comment by ID
/// GET /api/comments/{comment_id}
pub async fn get_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let viewer = actor_from_request(&req)?;
    let comment_id = parse_object_id(&path.into_inner(), "comment ID")?;

    let comment = comment_service
        .get_comment_by_id(&comment_id)
        .await?
        .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))?;
    let view = comment_service.to_view(&comment, &viewer).await?;

    Ok(respond(
        StatusCode::OK,
        "Comment retrieved successfully",
        json!({ "comment": view }),
    ))
}

/// Update a comment
/// PUT /api/comments/{comment_id}
pub async fn update_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let author = actor_from_request(&req)?;
    let comment_id = parse_object_id(&path.into_inner(), "comment ID")?;
    let content = require_text("Comment content", &body.content, MAX_COMMENT_LENGTH)?;

    let comment = comment_service
        .update_comment(&comment_id, &author, content)
        .await?;
    let view = comment_service.to_view(&comment, &author).await?;

    Ok(respond(
        StatusCode::OK,
        "Comment updated successfully",
        json!({ "comment": view }),
    ))
}

/// Delete a comment together with its replies
/// DELETE /api/comments/{comment_id}
pub async fn delete_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let author = actor_from_request(&req)?;
    let comment_id = parse_object_id(&path.into_inner(), "comment ID")?;

    let removed = comment_service.delete_comment(&comment_id, &author).await?;

    Ok(respond(
        StatusCode::OK,
        "Comment deleted successfully",
        json!({ "removed": removed }),
    ))
}

/// Get comment count for a post
/// GET /api/posts/{post_id}/comments/count
pub async fn get_comment_count(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let post_id = parse_object_id(&path.into_inner(), "post ID")?;

    let count = comment_service.get_comment_count(&post_id).await?;

    Ok(respond(
        StatusCode::OK,
        "Comment count retrieved successfully",
        json!({ "count": count }),
    ))
}
