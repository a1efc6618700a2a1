use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::middleware::auth::actor_from_request;
use crate::post::post_model::{CreatePostRequest, Post, UpdatePostRequest};
use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, respond};
use crate::utils::validation::{optional_text, validate_url};

const MAX_POST_LENGTH: usize = 3000;

fn checked_media_url(raw: Option<&str>) -> Result<Option<String>, CustomError> {
    let media_url = optional_text("Media URL", raw, 2048)?;
    if let Some(url) = &media_url {
        validate_url(url)?;
    }
    Ok(media_url)
}

pub async fn create_post(
    req: HttpRequest,
    post_service: web::Data<PostService>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    // Author comes from token
    let author = actor_from_request(&req)?;

    let content = optional_text("Post content", body.content.as_deref(), MAX_POST_LENGTH)?;
    let media_url = checked_media_url(body.media_url.as_deref())?;
    if content.is_none() && media_url.is_none() {
        return Err(CustomError::BadRequestError(
            "A post needs text or media".into(),
        ));
    }

    let now = chrono::Utc::now();
    let new_post = Post {
        id: ObjectId::new(),
        author,
        content,
        media_url,
        reactions: Vec::new(),
        comments_count: 0,
        shares_count: 0,
        is_highlighted: false,
        created_at: now,
        updated_at: now,
    };

    let inserted_post = post_service.create_post(new_post).await?;
    let view = post_service.to_view(&inserted_post, &author).await?;

    Ok(respond(
        StatusCode::CREATED,
        "Post created successfully",
        json!({ "post": view }),
    ))
}

/// Full snapshot, also used by the post-detail poller
/// GET /api/posts/{id}
pub async fn get_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let viewer = actor_from_request(&req)?;
    let post_id = parse_object_id(&post_id.into_inner(), "post ID")?;

    let post = post_service.require_post(&post_id).await?;
    let view = post_service.to_view(&post, &viewer).await?;

    Ok(respond(
        StatusCode::OK,
        "Post fetched successfully",
        json!({ "post": view }),
    ))
}

pub async fn update_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let author = actor_from_request(&req)?;
    let post_id = parse_object_id(&post_id.into_inner(), "post ID")?;
    let body = body.into_inner();

    let content = optional_text("Post content", body.content.as_deref(), MAX_POST_LENGTH)?;
    let media_url = checked_media_url(body.media_url.as_deref())?;

    let post = post_service
        .update_post(&post_id, &author, content, media_url, body.is_highlighted)
        .await?;
    let view = post_service.to_view(&post, &author).await?;

    Ok(respond(
        StatusCode::OK,
        "Post updated successfully",
        json!({ "post": view }),
    ))
}

pub async fn delete_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let author = actor_from_request(&req)?;
    let post_id = parse_object_id(&post_id.into_inner(), "post ID")?;

    post_service.delete_post(&post_id, &author).await?;

    Ok(respond(StatusCode::OK, "Post deleted successfully", json!({})))
}

pub async fn share_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let viewer = actor_from_request(&req)?;
    let post_id = parse_object_id(&post_id.into_inner(), "post ID")?;

    let post = post_service.share_post(&post_id).await?;
    let view = post_service.to_view(&post, &viewer).await?;

    Ok(respond(
        StatusCode::OK,
        "Post shared successfully",
        json!({ "post": view }),
    ))
}
