use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Named deployment environments the client can run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Staging,
    Unknown,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
            Environment::Staging => write!(f, "staging"),
            Environment::Unknown => write!(f, "unknown"),
        }
    }
}

/// Client configuration for one deployment environment.
///
/// Immutable once resolved; a fresh value is produced only by resolving
/// again. Safe to share read-only across any number of in-flight requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub base_url: Url,
    pub use_proxy: bool,
    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub environment: Environment,
}

impl EnvironmentConfig {
    /// Build a configuration, enforcing that at least one attempt is made
    /// per pipeline call.
    pub fn new(
        base_url: Url,
        use_proxy: bool,
        timeout: Duration,
        retry_attempts: u32,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        if retry_attempts == 0 {
            return Err(ConfigError::invalid_field(
                "retry_attempts",
                "must be at least 1",
            ));
        }
        if timeout.is_zero() {
            return Err(ConfigError::invalid_field("timeout", "must be non-zero"));
        }
        Ok(Self {
            base_url,
            use_proxy,
            timeout,
            retry_attempts,
            environment,
        })
    }

    /// Local development against the dev API server, fronted by the dev
    /// server proxy.
    pub fn development() -> Self {
        Self::fixed(
            "http://localhost:4000",
            true,
            Duration::from_millis(10_000),
            1,
            Environment::Development,
        )
    }

    /// Production deployment on the hosting platform.
    pub fn production() -> Self {
        Self::fixed(
            "https://uplink-api.up.railway.app",
            false,
            Duration::from_millis(15_000),
            3,
            Environment::Production,
        )
    }

    /// Staging deployment. Never auto-resolved; selected explicitly by a
    /// deploy that knows it is staging.
    pub fn staging() -> Self {
        Self::fixed(
            "https://uplink-api-staging.up.railway.app",
            false,
            Duration::from_millis(15_000),
            3,
            Environment::Staging,
        )
    }

    /// Unrecognized host: production's settings reported under the
    /// `unknown` name.
    pub fn unknown() -> Self {
        Self {
            environment: Environment::Unknown,
            ..Self::production()
        }
    }

    fn fixed(
        base_url: &str,
        use_proxy: bool,
        timeout: Duration,
        retry_attempts: u32,
        environment: Environment,
    ) -> Self {
        Self {
            base_url: Url::parse(base_url).expect("static base URL is valid"),
            use_proxy,
            timeout,
            retry_attempts,
            environment,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Network location of the running application.
///
/// Passed into the resolver explicitly, rather than read from ambient
/// state, so resolution stays a pure function and tests can inject fake
/// locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl Origin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Parse an origin from a URL string, keeping only scheme/host/port.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port: url.port(),
        })
    }

    /// Effective port, filling in the scheme default when none is set.
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or(match self.scheme.as_str() {
            "http" | "ws" => Some(80),
            "https" | "wss" => Some(443),
            _ => None,
        })
    }

    /// Whether a request to `url` leaves this origin.
    ///
    /// Same-origin means matching scheme, host, and effective port.
    pub fn is_cross_origin(&self, url: &Url) -> bool {
        if !url.scheme().eq_ignore_ascii_case(&self.scheme) {
            return true;
        }
        match url.host_str() {
            Some(host) if host.eq_ignore_ascii_case(&self.host) => {
                url.port_or_known_default() != self.effective_port()
            }
            _ => true,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_fixed_environments() {
        let dev = EnvironmentConfig::development();
        assert_eq!(dev.base_url.as_str(), "http://localhost:4000/");
        assert!(dev.use_proxy);
        assert_eq!(dev.retry_attempts, 1);

        let prod = EnvironmentConfig::production();
        assert_eq!(prod.environment, Environment::Production);
        assert_eq!(prod.timeout, Duration::from_millis(15_000));
        assert_eq!(prod.retry_attempts, 3);

        let staging = EnvironmentConfig::staging();
        assert_eq!(staging.environment, Environment::Staging);
    }

    #[test]
    fn test_unknown_reuses_production_settings() {
        let unknown = EnvironmentConfig::unknown();
        let prod = EnvironmentConfig::production();
        assert_eq!(unknown.environment, Environment::Unknown);
        assert_eq!(unknown.base_url, prod.base_url);
        assert_eq!(unknown.timeout, prod.timeout);
        assert_eq!(unknown.retry_attempts, prod.retry_attempts);
    }

    #[test]
    fn test_retry_attempts_must_be_positive() {
        let url = Url::parse("http://localhost:4000").unwrap();
        let result = EnvironmentConfig::new(
            url,
            false,
            Duration::from_secs(10),
            0,
            Environment::Development,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serialization_uses_millis() {
        let config = EnvironmentConfig::development();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 10_000);
        assert_eq!(json["environment"], "development");

        let back: EnvironmentConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_origin_parse() {
        let origin = Origin::parse("https://app.uplink.example/dashboard?tab=1").unwrap();
        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.host, "app.uplink.example");
        assert_eq!(origin.port, None);
        assert_eq!(origin.effective_port(), Some(443));
    }

    #[test]
    fn test_cross_origin_detection() {
        let origin = Origin::new("http", "localhost", Some(3000));

        let same = Url::parse("http://localhost:3000/api").unwrap();
        assert!(!origin.is_cross_origin(&same));

        let other_port = Url::parse("http://localhost:4000/api").unwrap();
        assert!(origin.is_cross_origin(&other_port));

        let other_scheme = Url::parse("https://localhost:3000/api").unwrap();
        assert!(origin.is_cross_origin(&other_scheme));

        let other_host = Url::parse("http://127.0.0.1:3000/api").unwrap();
        assert!(origin.is_cross_origin(&other_host));
    }

    #[test]
    fn test_default_port_matches_explicit() {
        let origin = Origin::new("https", "app.uplink.example", None);
        let explicit = Url::parse("https://app.uplink.example:443/x").unwrap();
        assert!(!origin.is_cross_origin(&explicit));
    }
}
