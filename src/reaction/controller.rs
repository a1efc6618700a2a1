use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::actor_from_request;
use crate::reaction::model::ReactionRequest;
use crate::reaction::service::ReactionService;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, respond};

/// Set, replace or clear the caller's reaction on a post
/// POST /api/posts/{post_id}/reaction
pub async fn react_to_post(
    req: HttpRequest,
    reaction_service: web::Data<ReactionService>,
    path: web::Path<String>,
    body: web::Json<ReactionRequest>,
) -> Result<HttpResponse, CustomError> {
    let actor = actor_from_request(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post ID")?;

    let snapshot = reaction_service
        .react_to_post(&post_id, actor, body.reaction_type)
        .await?;

    Ok(respond(
        StatusCode::OK,
        "Reaction updated successfully",
        json!(snapshot),
    ))
}

/// Set, replace or clear the caller's reaction on a comment
/// POST /api/comments/{comment_id}/reaction
pub async fn react_to_comment(
    req: HttpRequest,
    reaction_service: web::Data<ReactionService>,
    path: web::Path<String>,
    body: web::Json<ReactionRequest>,
) -> Result<HttpResponse, CustomError> {
    let actor = actor_from_request(&req)?;
    let comment_id = parse_object_id(&path.into_inner(), "comment ID")?;

    let snapshot = reaction_service
        .react_to_comment(&comment_id, actor, body.reaction_type)
        .await?;

    Ok(respond(
        StatusCode::OK,
        "Reaction updated successfully",
        json!(snapshot),
    ))
}
