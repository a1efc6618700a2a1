use std::env;
use std::time::Duration;

/// Settings for talking to the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            request_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("FEED_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let timeout_secs: u64 = env::var("FEED_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .map_err(|_| "FEED_API_TIMEOUT_SECS must be a valid number")?;

        let mut config = Self::new(base_url);
        config.token = env::var("FEED_API_TOKEN").ok().filter(|t| !t.is_empty());
        config.request_timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::new("http://api.local/").with_token("t");
        assert_eq!(config.base_url, "http://api.local");
        assert_eq!(config.token.as_deref(), Some("t"));
    }
}
