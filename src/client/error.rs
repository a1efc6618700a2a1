use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Text for the toast shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Transport(_) => "Could not reach the server. Please try again.".to_string(),
            ClientError::Decode(_) => "Something went wrong. Please try again.".to_string(),
            ClientError::Cancelled => String::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Log a failed user action; cancellations are expected and stay quiet.
    pub(crate) fn log(&self, action: &str) {
        if !self.is_cancelled() {
            log::error!("{} failed: {}", action, self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_surface_server_message() {
        let err = ClientError::Api { status: 404, message: "Not Found: Post not found".into() };
        assert_eq!(err.user_message(), "Not Found: Post not found");
        assert!(!err.is_cancelled());
        assert!(ClientError::Cancelled.is_cancelled());
        assert!(ClientError::Cancelled.user_message().is_empty());
    }
}
