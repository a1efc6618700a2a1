use super::controller::get_feed;
use actix_web::web;

pub fn feed_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/feed", web::get().to(get_feed));
}
