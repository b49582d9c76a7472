use crate::models::outcome::ErrorKind;
use async_trait::async_trait;
use std::time::Duration;

/// Everything the classifier may look at from one settled request attempt.
///
/// Built by the pipeline; call sites never inspect transport errors
/// directly.
#[derive(Debug, Clone, Default)]
pub struct FailureSignals {
    /// The cancellation timer fired before a response arrived.
    pub timed_out: bool,
    /// The transport settled with an error and no response was received.
    pub transport_failed: bool,
    /// The request left the application's origin.
    pub cross_origin: bool,
    /// HTTP status, when any response was received.
    pub status: Option<u16>,
    /// Error or response text to match phrases against.
    pub message: String,
    /// The response body failed to decode as the expected format.
    pub parse_failed: bool,
}

/// The single seam for error classification.
///
/// Matching rules are heuristic and expected to change; keeping them
/// behind this trait means call sites are untouched when they do.
pub trait Classify: Send + Sync {
    fn classify(&self, signals: &FailureSignals) -> ErrorKind;
}

/// Read-only view of the host's credential store.
///
/// The pipeline reads the bearer token but never writes it; an absent
/// token is a caller-side precondition failure, not a pipeline error.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Injected sleep so retry backoff is testable without real timers.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
