use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::follow::model::FollowStatus;
use crate::follow::service::FollowService;
use crate::middleware::auth::actor_from_request;
use crate::utils::error::CustomError;
use crate::utils::helpers::respond;
use crate::utils::model::{OwnerTypeQuery, parse_owner};

/// POST /api/follow/{id}?type=user|company
pub async fn follow(
    req: HttpRequest,
    follow_service: web::Data<FollowService>,
    path: web::Path<String>,
    query: web::Query<OwnerTypeQuery>,
) -> Result<HttpResponse, CustomError> {
    let follower = actor_from_request(&req)?;
    let target = parse_owner(query.kind, &path.into_inner())?;

    follow_service.follow(follower, target).await?;

    Ok(respond(
        StatusCode::CREATED,
        "Followed successfully",
        json!(FollowStatus { is_following: true }),
    ))
}

/// DELETE /api/follow/{id}?type=user|company
pub async fn unfollow(
    req: HttpRequest,
    follow_service: web::Data<FollowService>,
    path: web::Path<String>,
    query: web::Query<OwnerTypeQuery>,
) -> Result<HttpResponse, CustomError> {
    let follower = actor_from_request(&req)?;
    let target = parse_owner(query.kind, &path.into_inner())?;

    follow_service.unfollow(&follower, &target).await?;

    Ok(respond(
        StatusCode::OK,
        "Unfollowed successfully",
        json!(FollowStatus { is_following: false }),
    ))
}

/// POST /api/follow/check/{id}?type=user|company
pub async fn check_follow(
    req: HttpRequest,
    follow_service: web::Data<FollowService>,
    path: web::Path<String>,
    query: web::Query<OwnerTypeQuery>,
) -> Result<HttpResponse, CustomError> {
    let follower = actor_from_request(&req)?;
    let target = parse_owner(query.kind, &path.into_inner())?;

    let is_following = follow_service.is_following(&follower, &target).await?;

    Ok(respond(
        StatusCode::OK,
        "Follow status retrieved successfully",
        json!(FollowStatus { is_following }),
    ))
}

/// GET /api/follow/following
pub async fn list_following(
    req: HttpRequest,
    follow_service: web::Data<FollowService>,
) -> Result<HttpResponse, CustomError> {
    let follower = actor_from_request(&req)?;

    let following: Vec<_> = follow_service
        .following_of(&follower)
        .await?
        .into_iter()
        .map(|owner| owner.to_view(None))
        .collect();

    Ok(respond(
        StatusCode::OK,
        "Following retrieved successfully",
        json!({ "count": following.len(), "following": following }),
    ))
}
