use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::feed::service::timeline;
use crate::job::service::JobService;
use crate::middleware::auth::actor_from_request;
use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use crate::utils::helpers::respond;
use crate::utils::model::PageQuery;

/// Posts and open jobs in one timeline
/// GET /api/feed?page=&limit=
pub async fn get_feed(
    req: HttpRequest,
    post_service: web::Data<PostService>,
    job_service: web::Data<JobService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, CustomError> {
    let viewer = actor_from_request(&req)?;
    let (skip, limit) = query.bounds()?;

    let items = timeline(&post_service, &job_service, &viewer, skip, limit).await?;

    Ok(respond(
        StatusCode::OK,
        "Feed retrieved successfully",
        json!({ "count": items.len(), "items": items }),
    ))
}
