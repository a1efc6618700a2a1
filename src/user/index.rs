use super::controller::{get_profile, update_profile};
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/users/profile", web::put().to(update_profile))
        .route("/users/{id}", web::get().to(get_profile));
}
