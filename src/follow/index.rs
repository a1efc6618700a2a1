use super::controller::{check_follow, follow, list_following, unfollow};
use actix_web::web;

pub fn follow_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/follow/following", web::get().to(list_following))
        .route("/follow/check/{id}", web::post().to(check_follow))
        .route("/follow/{id}", web::post().to(follow))
        .route("/follow/{id}", web::delete().to(unfollow));
}
