//! Request descriptions handed to the pipeline

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use std::time::Duration;
use tracing::warn;

/// Body attached to a request
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    /// Serialized as JSON with `Content-Type: application/json`
    Json(serde_json::Value),
    /// Raw bytes. With no content type the header is omitted entirely and
    /// the transport is left to fill in framing parameters (multipart
    /// boundaries and the like).
    Raw {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

/// Per-call overrides merged over the environment configuration
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub timeout: Option<Duration>,
    pub retry_attempts: Option<u32>,
}

/// One HTTP request as the pipeline sees it.
///
/// `target` is either a path resolved against the environment's base URL
/// or a full URL passed through as-is.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub target: String,
    pub payload: Payload,
    pub headers: HeaderMap,
    pub params: Vec<(String, String)>,
    pub overrides: RequestOverrides,
}

impl RequestSpec {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            payload: Payload::Empty,
            headers: HeaderMap::new(),
            params: Vec::new(),
            overrides: RequestOverrides::default(),
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::PUT, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    /// Attach a JSON body
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    /// Attach a raw body; `content_type = None` leaves the header to the
    /// transport
    pub fn raw(mut self, bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        self.payload = Payload::Raw {
            bytes,
            content_type: content_type.map(str::to_string),
        };
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a bearer token as the `Authorization` header.
    ///
    /// The pipeline passes the header through to the wire unmodified.
    pub fn bearer(mut self, token: &str) -> Self {
        match HeaderValue::try_from(format!("Bearer {token}")) {
            Ok(value) => {
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Bearer token is not header-safe; Authorization header not set"),
        }
        self
    }

    /// Append a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Override the environment timeout for this call only
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.overrides.timeout = Some(timeout);
        self
    }

    /// Override the environment retry budget for this call only
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.overrides.retry_attempts = Some(attempts);
        self
    }
}
