use super::controller::{
    apply_to_job, create_job, delete_job, get_job, list_company_applications, list_company_jobs,
    update_application_status, update_job,
};
use actix_web::web;

pub fn job_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/jobs", web::post().to(create_job))
        .route("/jobs/{id}", web::get().to(get_job))
        .route("/jobs/{id}", web::put().to(update_job))
        .route("/jobs/{id}", web::delete().to(delete_job))
        .route("/jobs/{id}/applications", web::post().to(apply_to_job))
        .route("/companies/{id}/jobs", web::get().to(list_company_jobs))
        .route("/companies/{id}/applications", web::get().to(list_company_applications))
        .route("/applications/{id}/status", web::put().to(update_application_status));
}
