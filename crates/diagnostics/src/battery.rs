//! The diagnostic check battery and its report assembly

use std::time::Instant;
use tracing::{debug, warn};
use uplink_client::{ApiClient, RequestSpec};
use uplink_core::{DiagnosticReport, TokenSource};

pub const CHECK_ENVIRONMENT: &str = "environment";
pub const CHECK_CORS: &str = "cors";
pub const CHECK_API_CONNECTIVITY: &str = "apiConnectivity";
pub const CHECK_ADMIN_API: &str = "adminApi";
pub const CHECK_PLATFORM: &str = "platform";

const HEALTH_PATH: &str = "/health";
const ADMIN_USERS_PATH: &str = "/api/v1/admin/users";

/// Runs the diagnostic battery against one configured client.
///
/// Checks run sequentially in a fixed order and every check always runs:
/// a failing check is captured in the report and never aborts the rest,
/// and the battery itself never errors.
pub struct Diagnostics {
    client: ApiClient,
}

impl Diagnostics {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Run the quick battery: environment, cors, apiConnectivity.
    pub async fn run_quick(&self) -> DiagnosticReport {
        let mut report = DiagnosticReport::new(self.client.config().clone());
        self.check_environment(&mut report);
        self.check_cors(&mut report).await;
        self.check_api_connectivity(&mut report).await;
        report
    }

    /// Run the full battery: the quick checks plus the authorized admin
    /// probe and the hosting-platform connectivity signal.
    pub async fn run_full(&self, tokens: &dyn TokenSource) -> DiagnosticReport {
        let mut report = self.run_quick().await;
        self.check_admin_api(&mut report, tokens).await;
        self.check_platform(&mut report).await;
        report
    }

    /// Always passes; the details carry the resolved configuration
    /// snapshot for the presentation surface.
    fn check_environment(&self, report: &mut DiagnosticReport) {
        let details = serde_json::to_string(self.client.config())
            .unwrap_or_else(|err| format!("config serialization failed: {err}"));
        debug!(check = CHECK_ENVIRONMENT, "Diagnostic check passed");
        report.record(CHECK_ENVIRONMENT, true, details);
    }

    /// Bare GET of the base URL. Passes iff the transport completed —
    /// any HTTP status counts; only a status-less failure (the shape a
    /// cross-origin rejection takes) fails the check.
    async fn check_cors(&self, report: &mut DiagnosticReport) {
        let outcome = self.client.send(RequestSpec::get("/")).await;
        if outcome.response_received() {
            let details = format!("base URL reachable (HTTP {})", outcome.status.unwrap_or(0));
            debug!(check = CHECK_CORS, "Diagnostic check passed");
            report.record(CHECK_CORS, true, details);
        } else {
            let details = format!("{}: {}", outcome.error_kind, outcome.message);
            warn!(check = CHECK_CORS, details = %details, "Diagnostic check failed");
            report.record(CHECK_CORS, false, details);
        }
    }

    /// GET {base}/health. Passes iff any response arrived within the
    /// timeout, regardless of status code.
    async fn check_api_connectivity(&self, report: &mut DiagnosticReport) {
        let started = Instant::now();
        let outcome = self.client.send(RequestSpec::get(HEALTH_PATH)).await;
        let elapsed_ms = started.elapsed().as_millis();

        if outcome.response_received() {
            let details = format!(
                "health endpoint answered HTTP {} in {elapsed_ms}ms",
                outcome.status.unwrap_or(0)
            );
            debug!(check = CHECK_API_CONNECTIVITY, "Diagnostic check passed");
            report.record(CHECK_API_CONNECTIVITY, true, details);
        } else {
            let details = format!("{}: {}", outcome.error_kind, outcome.message);
            warn!(
                check = CHECK_API_CONNECTIVITY,
                details = %details,
                "Diagnostic check failed"
            );
            report.record(CHECK_API_CONNECTIVITY, false, details);
        }
    }

    /// Authorized GET of the admin listing endpoint. Passes iff HTTP 200
    /// and the body parsed as JSON. A missing token fails the check but
    /// never errors the battery; the token is read, never written.
    async fn check_admin_api(&self, report: &mut DiagnosticReport, tokens: &dyn TokenSource) {
        let Some(token) = tokens.token() else {
            let details = "no token in credential store; sign in before running the full battery";
            warn!(check = CHECK_ADMIN_API, details, "Diagnostic check failed");
            report.record(CHECK_ADMIN_API, false, details);
            return;
        };

        let outcome = self
            .client
            .send(RequestSpec::get(ADMIN_USERS_PATH).bearer(&token))
            .await;

        if outcome.status == Some(200) && outcome.body.is_some() {
            debug!(check = CHECK_ADMIN_API, "Diagnostic check passed");
            report.record(CHECK_ADMIN_API, true, "admin endpoint returned HTTP 200 with JSON body");
        } else {
            let details = match outcome.status {
                Some(status) => format!(
                    "admin endpoint answered HTTP {status} ({}): {}",
                    outcome.error_kind, outcome.message
                ),
                None => format!("{}: {}", outcome.error_kind, outcome.message),
            };
            warn!(check = CHECK_ADMIN_API, details = %details, "Diagnostic check failed");
            report.record(CHECK_ADMIN_API, false, details);
        }
    }

    /// Hosting-platform connectivity signal: GET of the base URL root,
    /// recording edge latency. Passes iff any response arrived.
    async fn check_platform(&self, report: &mut DiagnosticReport) {
        let started = Instant::now();
        let outcome = self.client.send(RequestSpec::get("/")).await;
        let elapsed_ms = started.elapsed().as_millis();

        if outcome.response_received() {
            let details = format!(
                "platform edge answered HTTP {} in {elapsed_ms}ms",
                outcome.status.unwrap_or(0)
            );
            debug!(check = CHECK_PLATFORM, "Diagnostic check passed");
            report.record(CHECK_PLATFORM, true, details);
        } else {
            let details = format!(
                "no response from platform edge after {elapsed_ms}ms ({}: {})",
                outcome.error_kind, outcome.message
            );
            warn!(check = CHECK_PLATFORM, details = %details, "Diagnostic check failed");
            report.record(CHECK_PLATFORM, false, details);
        }
    }
}

/// Fixed token source, for callers that already hold the credential and
/// for tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    token: Option<String>,
}

impl StaticTokens {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn empty() -> Self {
        Self { token: None }
    }
}

impl TokenSource for StaticTokens {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}
