use super::post_controller::{create_post, delete_post, get_post, share_post, update_post};
use crate::comment::controller::{create_comment, get_post_comments};
use crate::reaction::controller::react_to_post;
use actix_web::web;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts", web::post().to(create_post))
        .route("/posts/{id}", web::get().to(get_post))
        .route("/posts/{id}", web::put().to(update_post))
        .route("/posts/{id}", web::delete().to(delete_post))
        .route("/posts/{id}/share", web::post().to(share_post))
        .route("/posts/{id}/reaction", web::post().to(react_to_post))
        .route("/posts/{id}/comments", web::get().to(get_post_comments))
        .route("/posts/{id}/comments", web::post().to(create_comment));
}
