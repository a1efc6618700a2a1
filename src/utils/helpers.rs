use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use mongodb::bson::oid::ObjectId;
use serde_json::{Value, json};

use crate::utils::error::CustomError;

/// Replies shown under a comment before "see more".
pub const REPLY_PREVIEW_LIMIT: usize = 5;

/// Default and maximum page sizes for list endpoints.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Deepest page a list endpoint will serve.
pub const MAX_PAGE: u64 = 50;

pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

pub fn database_name() -> String {
    std::env::var("DATABASE_NAME").unwrap_or_else(|_| "jobfeed".to_string())
}

/// Parse a hex object id coming from a path or body, naming the field on failure.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| CustomError::BadRequestError(format!("Invalid {}", what)))
}

/// Build the success envelope and merge `payload`'s keys into it.
pub fn respond(status: StatusCode, message: &str, payload: Value) -> HttpResponse {
    let mut body = json!({
        "success": true,
        "message": message,
        "httpStatusCode": status.as_u16(),
        "service": service_name(),
    });

    if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), payload) {
        target.extend(extra);
    }

    HttpResponse::build(status).json(body)
}
