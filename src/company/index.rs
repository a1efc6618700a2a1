use super::controller::{create_company, get_company, list_companies, update_company};
use actix_web::web;

pub fn company_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/companies", web::post().to(create_company))
        .route("/companies", web::get().to(list_companies))
        .route("/companies/{id}", web::get().to(get_company))
        .route("/companies/{id}", web::put().to(update_company));
}
