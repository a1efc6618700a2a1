use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::company::service::CompanyService;
use crate::job::model::{ApplicationView, ApplyRequest, JobRequest, JobView, StatusUpdateRequest};
use crate::job::service::{JobService, job_from_request};
use crate::middleware::auth::claims_from_request;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, respond};

/// POST /api/jobs
///
/// The posting company comes from the body, or from the token when acting as a company.
pub async fn create_job(
    req: HttpRequest,
    job_service: web::Data<JobService>,
    company_service: web::Data<CompanyService>,
    body: web::Json<JobRequest>,
) -> Result<HttpResponse, CustomError> {
    let claims = claims_from_request(&req)?;
    let user = claims.user()?;

    let raw_company_id = body
        .company_id
        .clone()
        .or(claims.company_id.clone())
        .ok_or_else(|| CustomError::BadRequestError("companyId is required".to_string()))?;
    let company_id = parse_object_id(&raw_company_id, "company ID")?;
    company_service.require_admin(&company_id, &user.id).await?;

    let job = job_service.create_job(job_from_request(company_id, &body)?).await?;

    Ok(respond(
        StatusCode::CREATED,
        "Job created successfully",
        json!({ "job": JobView::from(&job) }),
    ))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    job_service: web::Data<JobService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let job_id = parse_object_id(&path.into_inner(), "job ID")?;
    let job = job_service.get_job(&job_id).await?;

    Ok(respond(
        StatusCode::OK,
        "Job fetched successfully",
        json!({ "job": JobView::from(&job) }),
    ))
}

/// PUT /api/jobs/{id}
pub async fn update_job(
    req: HttpRequest,
    job_service: web::Data<JobService>,
    company_service: web::Data<CompanyService>,
    path: web::Path<String>,
    body: web::Json<JobRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = claims_from_request(&req)?.user()?;
    let job_id = parse_object_id(&path.into_inner(), "job ID")?;

    let job = job_service.get_job(&job_id).await?;
    company_service.require_admin(&job.company_id, &user.id).await?;
    let updated = job_service.update_job(&job, &body).await?;

    Ok(respond(
        StatusCode::OK,
        "Job updated successfully",
        json!({ "job": JobView::from(&updated) }),
    ))
}

/// DELETE /api/jobs/{id}
pub async fn delete_job(
    req: HttpRequest,
    job_service: web::Data<JobService>,
    company_service: web::Data<CompanyService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user = claims_from_request(&req)?.user()?;
    let job_id = parse_object_id(&path.into_inner(), "job ID")?;

    let job = job_service.get_job(&job_id).await?;
    company_service.require_admin(&job.company_id, &user.id).await?;
    job_service.delete_job(&job.id).await?;

    Ok(respond(StatusCode::OK, "Job deleted successfully", json!({})))
}

/// GET /api/companies/{id}/jobs
pub async fn list_company_jobs(
    job_service: web::Data<JobService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let company_id = parse_object_id(&path.into_inner(), "company ID")?;
    let jobs: Vec<JobView> = job_service
        .jobs_for_company(&company_id)
        .await?
        .iter()
        .map(JobView::from)
        .collect();

    Ok(respond(
        StatusCode::OK,
        "Jobs retrieved successfully",
        json!({ "count": jobs.len(), "jobs": jobs }),
    ))
}

/// POST /api/jobs/{id}/applications
pub async fn apply_to_job(
    req: HttpRequest,
    job_service: web::Data<JobService>,
    path: web::Path<String>,
    body: web::Json<ApplyRequest>,
) -> Result<HttpResponse, CustomError> {
    let applicant = claims_from_request(&req)?.user()?;
    let job_id = parse_object_id(&path.into_inner(), "job ID")?;

    let job = job_service.get_job(&job_id).await?;
    let application = job_service.apply(&job, applicant.id, &body).await?;

    log::info!(
        "User {} applied to job {}",
        applicant.id.to_hex(),
        job.id.to_hex()
    );

    Ok(respond(
        StatusCode::CREATED,
        "Application submitted successfully",
        json!({ "application": ApplicationView::from(application) }),
    ))
}

/// GET /api/companies/{id}/applications
pub async fn list_company_applications(
    req: HttpRequest,
    job_service: web::Data<JobService>,
    company_service: web::Data<CompanyService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user = claims_from_request(&req)?.user()?;
    let company_id = parse_object_id(&path.into_inner(), "company ID")?;
    company_service.require_admin(&company_id, &user.id).await?;

    let applications: Vec<ApplicationView> = job_service
        .applications_for_company(&company_id)
        .await?
        .into_iter()
        .map(ApplicationView::from)
        .collect();

    Ok(respond(
        StatusCode::OK,
        "Applications retrieved successfully",
        json!({ "count": applications.len(), "applications": applications }),
    ))
}

/// PUT /api/applications/{id}/status
pub async fn update_application_status(
    req: HttpRequest,
    job_service: web::Data<JobService>,
    company_service: web::Data<CompanyService>,
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = claims_from_request(&req)?.user()?;
    let application_id = parse_object_id(&path.into_inner(), "application ID")?;

    let application = job_service.get_application(&application_id).await?;
    company_service
        .require_admin(&application.company_id, &user.id)
        .await?;
    let updated = job_service
        .update_application_status(&application, body.status)
        .await?;

    Ok(respond(
        StatusCode::OK,
        "Application updated successfully",
        json!({ "application": ApplicationView::from(updated) }),
    ))
}
