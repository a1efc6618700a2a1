use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::claims_from_request;
use crate::user::model::{ProfileView, UpdateProfileRequest};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, respond};

/// GET /api/users/{id}
pub async fn get_profile(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user_id = parse_object_id(&path.into_inner(), "user ID")?;
    let user = user_service.get_profile(&user_id).await?;

    Ok(respond(
        StatusCode::OK,
        "Profile fetched successfully",
        json!({ "profile": ProfileView::from(user) }),
    ))
}

/// PUT /api/users/profile
pub async fn update_profile(
    req: HttpRequest,
    user_service: web::Data<UserService>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, CustomError> {
    // Profiles belong to people, even when the token acts for a company
    let user = claims_from_request(&req)?.user()?;
    let updated = user_service.update_profile(&user.id, &body).await?;

    Ok(respond(
        StatusCode::OK,
        "Profile updated successfully",
        json!({ "profile": ProfileView::from(updated) }),
    ))
}
