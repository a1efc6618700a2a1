use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::utils::helpers::service_name;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    #[error("Bad Request: {0}")]
    BadRequestError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),
}

impl CustomError {
    /// Log a driver failure and hide its details behind a 500.
    pub fn database(context: &str, err: mongodb::error::Error) -> Self {
        log::error!("{}: {}", context, err);
        CustomError::InternalServerError(context.to_string())
    }

    pub fn code(&self) -> &'static str {
        match *self {
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::ForbiddenError(..) => "FORBIDDEN_ERROR",
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.code(),
            "service": service_name(),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn error_response_carries_envelope() {
        let err = CustomError::NotFoundError("Post not found".into());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["httpStatusCode"], 404);
        assert_eq!(value["error"], "NOT_FOUND_ERROR");
        assert_eq!(value["message"], "Not Found: Post not found");
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = CustomError::ValidationError("bad email".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CustomError::ForbiddenError("x".into()).status_code(), StatusCode::FORBIDDEN);
    }
}
