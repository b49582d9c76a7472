use thiserror::Error;

/// Transport and HTTP-level errors raised inside the request pipeline
/// before being normalized into a `RequestOutcome`
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {message}")]
    HttpRequest {
        message: String,
        status: Option<u16>,
    },

    #[error("Network error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Cross-origin request rejected: {message}")]
    CorsRejected { message: String },
}

impl NetworkError {
    pub fn http_request(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpRequest {
            message: message.into(),
            status,
        }
    }

    pub fn cors_rejected(message: impl Into<String>) -> Self {
        Self::CorsRejected {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Timeouts and status-less transport failures are worth retrying; a
    /// cross-origin rejection or a 4xx comes back identical on every
    /// attempt.
    pub fn is_recoverable(&self) -> bool {
        match self {
            NetworkError::Timeout => true,
            NetworkError::HttpRequest { status: None, .. } => true,
            NetworkError::HttpRequest {
                status: Some(s), ..
            } => *s >= 500,
            NetworkError::Reqwest(e) => e.status().map_or(true, |s| s.is_server_error()),
            NetworkError::CorsRejected { .. } => false,
        }
    }
}
