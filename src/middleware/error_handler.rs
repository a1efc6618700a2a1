use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, Result};
use serde_json::json;

use crate::utils::helpers::service_name;

/// True when a handler already produced a JSON body.
pub(crate) fn is_json<B>(res: &ServiceResponse<B>) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Rewrite framework errors (bad JSON, auth rejections, ...) into the JSON envelope.
///
/// Responses that already carry JSON, i.e. our own `CustomError`s, pass through.
pub fn handle_error<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    if is_json(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let status_code = res.status();
    let error_message = res
        .response()
        .error()
        .map(|e| e.to_string())
        .unwrap_or_else(|| status_code.canonical_reason().unwrap_or("Unknown error").to_string());

    let new_response = HttpResponse::build(status_code).json(json!({
        "success": false,
        "message": error_message,
        "httpStatusCode": status_code.as_u16(),
        "error": status_code.canonical_reason().unwrap_or("Unknown"),
        "service": service_name(),
    }));

    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, new_response.map_into_right_body());

    Ok(ErrorHandlerResponse::Response(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::not_found::not_found;
    use actix_web::http::StatusCode;
    use actix_web::middleware::ErrorHandlers;
    use actix_web::{App, test, web};

    async fn teapot() -> HttpResponse {
        HttpResponse::build(StatusCode::IM_A_TEAPOT).body("short and stout")
    }

    async fn missing_post() -> Result<HttpResponse, crate::utils::error::CustomError> {
        Err(crate::utils::error::CustomError::NotFoundError("Post not found".into()))
    }

    #[actix_web::test]
    async fn plain_errors_become_json() {
        let app = test::init_service(
            App::new()
                .wrap(
                    ErrorHandlers::new()
                        .handler(StatusCode::NOT_FOUND, not_found)
                        .default_handler(handle_error),
                )
                .route("/teapot", web::get().to(teapot))
                .route("/posts/missing", web::get().to(missing_post)),
        )
        .await;

        let req = test::TestRequest::get().uri("/teapot").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["httpStatusCode"], 418);

        let req = test::TestRequest::get().uri("/nowhere").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Route does not exist");

        let req = test::TestRequest::get().uri("/posts/missing").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Not Found: Post not found");
        assert_eq!(body["error"], "NOT_FOUND_ERROR");
    }
}
