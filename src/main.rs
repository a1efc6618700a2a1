use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use serde_json::json;

use jobfeed::comment::service::CommentService;
use jobfeed::company::service::CompanyService;
use jobfeed::database::{self, RedisService};
use jobfeed::follow::service::FollowService;
use jobfeed::job::service::JobService;
use jobfeed::middleware::error_handler::handle_error;
use jobfeed::middleware::not_found::not_found;
use jobfeed::post::post_service::PostService;
use jobfeed::reaction::service::ReactionService;
use jobfeed::router::index::routes;
use jobfeed::user::service::UserService;
use jobfeed::utils::config::ServerConfig;
use jobfeed::utils::helpers::service_name;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Welcome to the jobfeed API",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mongo_client = database::connect_to_mongo(&config.mongodb_uri, &config.database_name)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to MongoDB: {}", e)))?;

    // Without Redis the auth middleware trusts the JWT alone
    let redis_service = match &config.redis_url {
        Some(url) => match database::connect_to_redis(url).await {
            Ok(client) => Some(web::Data::new(RedisService::new(&client))),
            Err(e) => {
                warn!("{}; continuing without session checks", e);
                None
            }
        },
        None => None,
    };

    let post_service = web::Data::new(PostService::new(&mongo_client));
    let comment_service = web::Data::new(CommentService::new(&mongo_client));
    let reaction_service = web::Data::new(ReactionService::new(&mongo_client));
    let follow_service = web::Data::new(FollowService::new(&mongo_client));
    let user_service = web::Data::new(UserService::new(&mongo_client));
    let company_service = web::Data::new(CompanyService::new(&mongo_client));
    let job_service = web::Data::new(JobService::new(&mongo_client));

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .app_data(post_service.clone())
            .app_data(comment_service.clone())
            .app_data(reaction_service.clone())
            .app_data(follow_service.clone())
            .app_data(user_service.clone())
            .app_data(company_service.clone())
            .app_data(job_service.clone());

        if let Some(redis) = &redis_service {
            app = app.app_data(redis.clone());
        }

        app.configure(routes).service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
