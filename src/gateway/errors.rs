#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Non-2xx response, normalized from the response body.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid id {0:?}")]
    InvalidId(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Human-readable message for display, or `fallback` when the error carries none.
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}
