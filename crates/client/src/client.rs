//! The request pipeline: one HTTP call with timeout, logging, and error
//! classification, plus the retry wrapper over it.

use crate::classify::{signals_from_transport_error, RuleClassifier};
use crate::environment::resolve;
use crate::request::{Payload, RequestSpec};
use crate::retry::{run_with_retry, TokioSleeper};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::sync::Arc;
use tracing::{debug, warn};
use uplink_core::{
    error::NetworkError, Classify, EnvironmentConfig, ErrorKind, FailureSignals, Origin,
    RequestOutcome, Result, Sleeper,
};
use url::Url;

/// HTTP client bound to one resolved environment.
///
/// Every call settles into exactly one [`RequestOutcome`]; transport
/// exceptions never escape to the caller.
pub struct ApiClient {
    http: reqwest::Client,
    config: EnvironmentConfig,
    origin: Origin,
    classifier: Arc<dyn Classify>,
    sleeper: Arc<dyn Sleeper>,
}

/// Builder for [`ApiClient`] with overridable seams
pub struct ApiClientBuilder {
    origin: Origin,
    config: Option<EnvironmentConfig>,
    classifier: Option<Arc<dyn Classify>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl ApiClientBuilder {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            config: None,
            classifier: None,
            sleeper: None,
        }
    }

    /// Use an explicit configuration instead of resolving one from the
    /// origin
    pub fn with_config(mut self, config: EnvironmentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Swap the classification rules
    pub fn with_classifier(mut self, classifier: Arc<dyn Classify>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Swap the sleep implementation used between retry attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let config = self.config.unwrap_or_else(|| resolve(&self.origin));

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(concat!("uplink/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(NetworkError::from)?;

        Ok(ApiClient {
            http,
            config,
            origin: self.origin,
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(RuleClassifier::default())),
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
        })
    }
}

impl ApiClient {
    /// Resolve the environment for `origin` and build a client for it
    pub fn from_origin(origin: Origin) -> Result<Self> {
        ApiClientBuilder::new(origin).build()
    }

    pub fn builder(origin: Origin) -> ApiClientBuilder {
        ApiClientBuilder::new(origin)
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Issue one request.
    ///
    /// Arms a cancellation timer for the effective timeout, classifies any
    /// failure, and always resolves to a single outcome. The timer is
    /// dropped with the future on every path, so it cannot fire after the
    /// call has settled.
    pub async fn send(&self, spec: RequestSpec) -> RequestOutcome {
        let url = match self.resolve_target(&spec.target) {
            Ok(url) => url,
            Err(err) => {
                return RequestOutcome::failed(
                    ErrorKind::Network,
                    None,
                    format!("invalid request target '{}': {err}", spec.target),
                )
            }
        };

        let cross_origin = self.origin.is_cross_origin(&url);
        let timeout = spec.overrides.timeout.unwrap_or(self.config.timeout);

        debug!(
            method = %spec.method,
            url = %url,
            cross_origin,
            timeout_ms = timeout.as_millis() as u64,
            "Issuing request"
        );

        let request = self.build_request(&spec, url.clone());
        let outcome = match tokio::time::timeout(timeout, request.send()).await {
            Err(_elapsed) => RequestOutcome::failed(
                ErrorKind::Timeout,
                None,
                format!("request to {url} exceeded {}ms", timeout.as_millis()),
            ),
            Ok(Err(error)) => {
                let signals = signals_from_transport_error(&error, cross_origin);
                let kind = self.classifier.classify(&signals);
                RequestOutcome::failed(kind, signals.status, signals.message)
            }
            Ok(Ok(response)) => self.settle_response(response, cross_origin).await,
        };

        if !outcome.success {
            warn!(
                url = %url,
                kind = %outcome.error_kind,
                status = outcome.status,
                message = %outcome.message,
                "Request failed"
            );
        }

        outcome
    }

    /// Issue a request, retrying transient failures with exponential
    /// backoff up to the environment's attempt budget.
    ///
    /// Retries are invisible to the caller: only the final attempt's
    /// outcome is returned.
    pub async fn send_with_retry(&self, spec: RequestSpec) -> RequestOutcome {
        let attempts = spec
            .overrides
            .retry_attempts
            .unwrap_or(self.config.retry_attempts);
        run_with_retry(attempts, self.sleeper.as_ref(), |_attempt| {
            self.send(spec.clone())
        })
        .await
    }

    pub async fn get(&self, target: &str) -> RequestOutcome {
        self.send(RequestSpec::get(target)).await
    }

    pub async fn post(&self, target: &str, body: serde_json::Value) -> RequestOutcome {
        self.send(RequestSpec::post(target).json(body)).await
    }

    pub async fn put(&self, target: &str, body: serde_json::Value) -> RequestOutcome {
        self.send(RequestSpec::put(target).json(body)).await
    }

    pub async fn delete(&self, target: &str) -> RequestOutcome {
        self.send(RequestSpec::delete(target)).await
    }

    /// Resolve a path against the base URL; full URLs pass through
    fn resolve_target(&self, target: &str) -> std::result::Result<Url, url::ParseError> {
        if target.starts_with("http://") || target.starts_with("https://") {
            Url::parse(target)
        } else {
            self.config.base_url.join(target)
        }
    }

    fn build_request(&self, spec: &RequestSpec, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.http.request(spec.method.clone(), url);

        if !spec.params.is_empty() {
            request = request.query(&spec.params);
        }

        request = match &spec.payload {
            Payload::Empty => request,
            Payload::Json(value) => request.json(value),
            Payload::Raw {
                bytes,
                content_type,
            } => {
                let request = request.body(bytes.clone());
                match content_type {
                    Some(content_type) => {
                        request.header(reqwest::header::CONTENT_TYPE, content_type.as_str())
                    }
                    // No content type: the transport fills in framing
                    // parameters itself.
                    None => request,
                }
            }
        };

        // Caller headers win over pipeline defaults; Authorization passes
        // through untouched.
        request.headers(spec.headers.clone())
    }

    async fn settle_response(
        &self,
        response: reqwest::Response,
        cross_origin: bool,
    ) -> RequestOutcome {
        let status = response.status().as_u16();

        let text = match response.text().await {
            Ok(text) => text,
            Err(error) => {
                let signals = signals_from_transport_error(&error, cross_origin);
                let kind = self.classifier.classify(&signals);
                return RequestOutcome::failed(kind, Some(status), signals.message);
            }
        };

        if status >= 400 {
            let message = format!("HTTP {status}: {text}");
            let kind = self.classifier.classify(&FailureSignals {
                cross_origin,
                status: Some(status),
                message: message.clone(),
                ..Default::default()
            });
            return RequestOutcome::failed(kind, Some(status), message);
        }

        if text.is_empty() {
            return RequestOutcome::ok(status, None);
        }

        match serde_json::from_str(&text) {
            Ok(body) => RequestOutcome::ok(status, Some(body)),
            Err(error) => {
                let signals = FailureSignals {
                    cross_origin,
                    status: Some(status),
                    message: format!("response body is not valid JSON: {error}"),
                    parse_failed: true,
                    ..Default::default()
                };
                let kind = self.classifier.classify(&signals);
                RequestOutcome::failed(kind, Some(status), signals.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;
    use std::time::Duration;
    use uplink_core::Environment;

    fn test_client(server: &Server) -> ApiClient {
        let base_url = Url::parse(&server.url()).unwrap();
        let config = EnvironmentConfig::new(
            base_url,
            false,
            Duration::from_secs(5),
            1,
            Environment::Development,
        )
        .unwrap();
        // Same-origin with the mock server so transport failures do not
        // trip the CORS heuristic.
        let origin = Origin::parse(&server.url()).unwrap();
        ApiClient::builder(origin).with_config(config).build().unwrap()
    }

    #[tokio::test]
    async fn test_json_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client.get("/health").await;

        assert!(outcome.success);
        assert_eq!(outcome.status, Some(200));
        assert_eq!(outcome.body, Some(json!({"status": "ok"})));
        assert_eq!(outcome.error_kind, ErrorKind::None);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_body_success() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/v1/widgets/1")
            .with_status(204)
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client.delete("/api/v1/widgets/1").await;

        assert!(outcome.success);
        assert_eq!(outcome.status, Some(204));
        assert!(outcome.body.is_none());
    }

    #[tokio::test]
    async fn test_client_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client.get("/missing").await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, Some(404));
        assert_eq!(outcome.error_kind, ErrorKind::HttpClientError);
        assert!(outcome.message.contains("HTTP 404"));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/boom")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client.get("/boom").await;

        assert_eq!(outcome.error_kind, ErrorKind::HttpServerError);
        assert_eq!(outcome.status, Some(502));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_parse_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>hello</html>")
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client.get("/page").await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, ErrorKind::Parse);
        assert_eq!(outcome.status, Some(200));
    }

    #[tokio::test]
    async fn test_authorization_header_passes_through() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/admin/users")
            .match_header("authorization", "Bearer admin-token")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client
            .send(RequestSpec::get("/api/v1/admin/users").bearer("admin-token"))
            .await;

        assert!(outcome.success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_params_reach_the_wire() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "rust http".into()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client
            .send(RequestSpec::get("/search").param("q", "rust http"))
            .await;

        assert!(outcome.success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_json_payload_sets_content_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/widgets")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({"name": "a"})))
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client.post("/api/v1/widgets", json!({"name": "a"})).await;

        assert!(outcome.success);
        assert_eq!(outcome.body, Some(json!({"id": 1})));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_target_settles_without_panicking() {
        let server = Server::new_async().await;
        let client = test_client(&server);

        let outcome = client.get("http://").await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("invalid request target"));
    }

    #[tokio::test]
    async fn test_absolute_url_passes_through() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/elsewhere")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server);
        let outcome = client.get(&format!("{}/elsewhere", server.url())).await;

        assert!(outcome.success);
        mock.assert_async().await;
    }
}
