use crate::comment::index::comment_routes;
use crate::company::index::company_routes;
use crate::feed::index::feed_routes;
use crate::follow::index::follow_routes;
use crate::job::index::job_routes;
use crate::middleware::auth::verify_token;
use crate::post::post_index::post_routes;
use crate::user::index::user_routes;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(HttpAuthentication::bearer(verify_token))
            .configure(feed_routes)
            .configure(post_routes)
            .configure(comment_routes)
            .configure(follow_routes)
            .configure(user_routes)
            .configure(company_routes)
            .configure(job_routes),
    );
}
