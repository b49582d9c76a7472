mod config;
mod context;
mod network;

pub use config::ConfigError;
pub use context::ErrorContext;
pub use network::NetworkError;

use thiserror::Error;

/// Main error type that encompasses all domain-specific errors
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error is recoverable (can retry the operation)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_recoverable(),
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network(_) => ErrorCategory::Network,
            Error::Config(_) => ErrorCategory::Configuration,
            Error::Serialization(_) | Error::UrlParse(_) => ErrorCategory::Data,
            Error::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for classification in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = Error::from(NetworkError::Timeout);
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.category().to_string(), "network");

        let err = Error::from(ConfigError::missing_field("base_url"));
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = Error::Internal("boom".to_string());
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::from(NetworkError::Timeout).is_recoverable());
        assert!(!Error::from(ConfigError::missing_field("token")).is_recoverable());
        assert!(!Error::Internal("boom".to_string()).is_recoverable());
    }
}
