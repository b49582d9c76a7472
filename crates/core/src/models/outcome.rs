use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of how a request attempt failed, if it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    None,
    Cors,
    Network,
    HttpClientError,
    HttpServerError,
    Timeout,
    Parse,
}

impl ErrorKind {
    /// Whether a failure of this kind is transient enough to retry.
    ///
    /// Cross-origin rejections and HTTP client errors come back identical
    /// on every attempt; only transport-level failures are worth another
    /// try.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::None => write!(f, "none"),
            ErrorKind::Cors => write!(f, "cors"),
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::HttpClientError => write!(f, "http client error"),
            ErrorKind::HttpServerError => write!(f, "http server error"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// The settled result of one pipeline call.
///
/// Created once per call and never mutated; retries happen inside the
/// pipeline and only the final attempt's outcome is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub success: bool,
    pub status: Option<u16>,
    pub body: Option<serde_json::Value>,
    pub error_kind: ErrorKind,
    pub message: String,
}

impl RequestOutcome {
    pub fn ok(status: u16, body: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            status: Some(status),
            body,
            error_kind: ErrorKind::None,
            message: String::new(),
        }
    }

    pub fn failed(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            body: None,
            error_kind: kind,
            message: message.into(),
        }
    }

    /// Whether any HTTP response was received at all, regardless of
    /// status. Distinguishes "server answered badly" from "nothing
    /// answered".
    pub fn response_received(&self) -> bool {
        self.status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::Cors.is_retryable());
        assert!(!ErrorKind::HttpClientError.is_retryable());
        assert!(!ErrorKind::HttpServerError.is_retryable());
        assert!(!ErrorKind::Parse.is_retryable());
        assert!(!ErrorKind::None.is_retryable());
    }

    #[test]
    fn test_ok_outcome() {
        let outcome = RequestOutcome::ok(200, Some(json!({"status": "ok"})));
        assert!(outcome.success);
        assert_eq!(outcome.status, Some(200));
        assert_eq!(outcome.error_kind, ErrorKind::None);
        assert!(outcome.response_received());
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = RequestOutcome::failed(ErrorKind::Cors, None, "blocked");
        assert!(!outcome.success);
        assert!(outcome.body.is_none());
        assert!(!outcome.response_received());
    }

    #[test]
    fn test_error_kind_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(ErrorKind::HttpClientError).unwrap(),
            json!("httpClientError")
        );
        assert_eq!(serde_json::to_value(ErrorKind::Cors).unwrap(), json!("cors"));
    }
}
