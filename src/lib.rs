pub mod client;
pub mod comment;
pub mod company;
pub mod database;
pub mod feed;
pub mod follow;
pub mod job;
pub mod middleware;
pub mod post;
pub mod reaction;
pub mod router;
pub mod user;
pub mod utils;
