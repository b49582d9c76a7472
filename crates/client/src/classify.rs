//! String-heuristic classification of failed requests

use serde::{Deserialize, Serialize};
use uplink_core::{Classify, ErrorKind, FailureSignals};

/// Fixed phrase lists the classifier matches error text against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Phrases that mark a cross-origin rejection
    pub cors_phrases: Vec<String>,
    /// Phrases that mark a plain transport failure
    pub network_phrases: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            cors_phrases: vec![
                "CORS".to_string(),
                "Access-Control-Allow-Origin".to_string(),
                "Cross-Origin Request Blocked".to_string(),
            ],
            network_phrases: vec![
                "Network Error".to_string(),
                "ERR_NETWORK".to_string(),
                "ERR_FAILED".to_string(),
                "connection refused".to_string(),
                "connection reset".to_string(),
                "dns error".to_string(),
            ],
        }
    }
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load phrase lists from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize phrase lists to a TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Rule-based [`Classify`] implementation over fixed phrase lists.
///
/// CORS detection is a documented precision limitation, not a bug:
/// browser-style transports surface a cross-origin rejection as a
/// status-less failure with no structured marker, so a status-less
/// cross-origin transport failure (a DNS outage, say) classifies the same
/// way. The rules live behind the `Classify` trait so they can be
/// sharpened without touching pipeline call sites.
///
/// Precedence when several signals match:
/// timeout > cors > network > HTTP status > parse > none.
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier {
    config: ClassifierConfig,
}

impl RuleClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    fn matches_any(message: &str, phrases: &[String]) -> bool {
        let message = message.to_lowercase();
        phrases
            .iter()
            .any(|phrase| message.contains(&phrase.to_lowercase()))
    }
}

impl Classify for RuleClassifier {
    fn classify(&self, signals: &FailureSignals) -> ErrorKind {
        if signals.timed_out {
            return ErrorKind::Timeout;
        }

        let silent_cross_origin_failure =
            signals.transport_failed && signals.status.is_none() && signals.cross_origin;
        if silent_cross_origin_failure || Self::matches_any(&signals.message, &self.config.cors_phrases)
        {
            return ErrorKind::Cors;
        }

        if Self::matches_any(&signals.message, &self.config.network_phrases) {
            return ErrorKind::Network;
        }

        // A transport failure nothing above recognized still never reached
        // the server; group it with network failures so it stays retryable.
        if signals.transport_failed && signals.status.is_none() {
            return ErrorKind::Network;
        }

        match signals.status {
            Some(status) if (400..=499).contains(&status) => return ErrorKind::HttpClientError,
            Some(status) if status >= 500 => return ErrorKind::HttpServerError,
            _ => {}
        }

        if signals.parse_failed {
            return ErrorKind::Parse;
        }

        ErrorKind::None
    }
}

/// Gather classification signals from a settled transport error.
///
/// The interesting detail (connect refused, DNS failure, decode error) is
/// buried in the error's source chain, so the chain is flattened into the
/// message the phrase lists match against.
pub fn signals_from_transport_error(error: &reqwest::Error, cross_origin: bool) -> FailureSignals {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }

    FailureSignals {
        timed_out: error.is_timeout(),
        transport_failed: error.status().is_none(),
        cross_origin,
        status: error.status().map(|s| s.as_u16()),
        message,
        parse_failed: error.is_decode(),
    }
}
