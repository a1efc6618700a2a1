use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::company::model::{CompanyRequest, CompanyView};
use crate::company::service::CompanyService;
use crate::middleware::auth::claims_from_request;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, respond};
use crate::utils::model::PageQuery;

/// POST /api/companies
pub async fn create_company(
    req: HttpRequest,
    company_service: web::Data<CompanyService>,
    body: web::Json<CompanyRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = claims_from_request(&req)?.user()?;
    let company = company_service.create_company(user.id, &body).await?;

    log::info!("Company {} created by {}", company.id.to_hex(), user.id.to_hex());

    Ok(respond(
        StatusCode::CREATED,
        "Company created successfully",
        json!({ "company": CompanyView::from(company) }),
    ))
}

/// GET /api/companies
pub async fn list_companies(
    company_service: web::Data<CompanyService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, CustomError> {
    let (skip, limit) = query.bounds()?;
    let companies: Vec<CompanyView> = company_service
        .list_companies(skip, limit)
        .await?
        .into_iter()
        .map(CompanyView::from)
        .collect();

    Ok(respond(
        StatusCode::OK,
        "Companies retrieved successfully",
        json!({ "count": companies.len(), "companies": companies }),
    ))
}

/// GET /api/companies/{id}
pub async fn get_company(
    company_service: web::Data<CompanyService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let company_id = parse_object_id(&path.into_inner(), "company ID")?;
    let company = company_service.get_company(&company_id).await?;

    Ok(respond(
        StatusCode::OK,
        "Company fetched successfully",
        json!({ "company": CompanyView::from(company) }),
    ))
}

/// PUT /api/companies/{id}
pub async fn update_company(
    req: HttpRequest,
    company_service: web::Data<CompanyService>,
    path: web::Path<String>,
    body: web::Json<CompanyRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = claims_from_request(&req)?.user()?;
    let company_id = parse_object_id(&path.into_inner(), "company ID")?;

    let company = company_service
        .update_company(&company_id, &user.id, &body)
        .await?;

    Ok(respond(
        StatusCode::OK,
        "Company updated successfully",
        json!({ "company": CompanyView::from(company) }),
    ))
}
