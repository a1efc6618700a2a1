use std::env;

/// Server settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub redis_url: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| "PORT must be a valid number")?,
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: crate::utils::helpers::database_name(),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
        })
    }
}
