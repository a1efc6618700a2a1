use super::controller::{delete_comment, get_comment, get_comment_count, update_comment};
use crate::reaction::controller::react_to_comment;
use actix_web::web;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts/{post_id}/comments/count", web::get().to(get_comment_count))
        .route("/comments/{comment_id}", web::get().to(get_comment))
        .route("/comments/{comment_id}", web::put().to(update_comment))
        .route("/comments/{comment_id}", web::delete().to(delete_comment))
        .route("/comments/{comment_id}/reaction", web::post().to(react_to_comment));
}
