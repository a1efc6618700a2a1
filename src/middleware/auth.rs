use actix_web::{Error, HttpMessage, HttpRequest, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::database::RedisService;
use crate::utils::error::CustomError;
use crate::utils::helpers::parse_object_id;
use crate::utils::model::OwnerRef;

/// Token claims issued by the identity provider.
///
/// `company_id` is set when the user is acting as one of their company pages.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

impl Claims {
    /// The identity that owns posts, reactions and follows made with this token.
    pub fn actor(&self) -> Result<OwnerRef, CustomError> {
        match &self.company_id {
            Some(company_id) => Ok(OwnerRef::company(parse_object_id(company_id, "company ID in token")?)),
            None => Ok(OwnerRef::user(parse_object_id(&self.id, "user ID in token")?)),
        }
    }

    /// The human behind the token, even when acting as a company.
    pub fn user(&self) -> Result<OwnerRef, CustomError> {
        Ok(OwnerRef::user(parse_object_id(&self.id, "user ID in token")?))
    }
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string())
}

/// Verify the bearer JWT and, when Redis is configured, that its session is still live
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let token = credentials.token();

    let token_data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data,
        Err(e) => {
            log::debug!("Rejected bearer token: {}", e);
            return Err((actix_web::error::ErrorUnauthorized("Invalid token"), req));
        }
    };

    let redis_service = match req.app_data::<web::Data<RedisService>>() {
        Some(service) => service.clone(),
        None => {
            req.extensions_mut().insert(token_data.claims);
            return Ok(req);
        }
    };

    match redis_service.validate_session(token).await {
        Ok(Some(stored_user_id)) if stored_user_id == token_data.claims.id => {
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
        Ok(Some(_)) => Err((actix_web::error::ErrorUnauthorized("Session mismatch"), req)),
        Ok(None) => Err((
            actix_web::error::ErrorUnauthorized("Session expired or invalid"),
            req,
        )),
        Err(e) => {
            // Redis outage: fall back to the JWT alone
            log::warn!("Session lookup failed, trusting JWT: {}", e);
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
    }
}

/// Sign claims with the shared secret, valid for `hours`.
pub fn create_token(user_id: &str, company_id: Option<&str>, hours: i64) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(hours))
        .ok_or_else(|| CustomError::InternalServerError("Invalid token expiry".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_owned(),
        exp: expiration,
        company_id: company_id.map(str::to_owned),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map_err(|_| CustomError::BadRequestError("Token generation failed".to_string()))
}

pub fn claims_from_request(req: &HttpRequest) -> Result<Claims, CustomError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| CustomError::UnauthorizedError("Not authenticated".to_string()))
}

/// Get the acting owner from request extensions (use after auth middleware)
pub fn actor_from_request(req: &HttpRequest) -> Result<OwnerRef, CustomError> {
    claims_from_request(req)?.actor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test};
    use actix_web_httpauth::middleware::HttpAuthentication;
    use mongodb::bson::oid::ObjectId;

    async fn whoami(req: HttpRequest) -> Result<HttpResponse, CustomError> {
        let actor = actor_from_request(&req)?;
        Ok(HttpResponse::Ok().body(format!("{}:{}", actor.kind, actor.id.to_hex())))
    }

    #[actix_web::test]
    async fn missing_token_is_rejected() {
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(HttpAuthentication::bearer(verify_token))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/me").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = actix_test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn company_claim_makes_company_actor() {
        let user_id = ObjectId::new().to_hex();
        let company_id = ObjectId::new().to_hex();
        let token = create_token(&user_id, Some(&company_id), 1).unwrap();

        let app = actix_test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(HttpAuthentication::bearer(verify_token))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, format!("company:{}", company_id).as_bytes());
    }

    #[test]
    fn user_actor_without_company() {
        let id = ObjectId::new();
        let claims = Claims { id: id.to_hex(), exp: 0, company_id: None };
        assert_eq!(claims.actor().unwrap(), OwnerRef::user(id));
        assert!(Claims { id: "bad".into(), exp: 0, company_id: None }.actor().is_err());
    }
}
