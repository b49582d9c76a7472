//! Environment resolution from the application's network location

use tracing::debug;
use uplink_core::{EnvironmentConfig, Origin};

/// Hosting-platform domain suffixes that mark a production deployment
pub const HOSTING_SUFFIXES: &[&str] = &[
    "up.railway.app",
    "railway.app",
    "vercel.app",
    "netlify.app",
    "github.io",
];

/// Derive the client configuration for the given network location.
///
/// Pure function of `origin`, evaluated in order: localhost maps to
/// development, a known hosting-platform suffix to production, and any
/// other host to production's settings reported under the `unknown` name.
/// Always returns a value.
pub fn resolve(origin: &Origin) -> EnvironmentConfig {
    let host = origin.host.to_ascii_lowercase();

    let config = if host == "localhost" || host == "127.0.0.1" {
        EnvironmentConfig::development()
    } else if HOSTING_SUFFIXES.iter().any(|suffix| host.contains(suffix)) {
        EnvironmentConfig::production()
    } else {
        EnvironmentConfig::unknown()
    };

    debug!(
        origin = %origin,
        environment = %config.environment,
        base_url = %config.base_url,
        "Resolved environment"
    );

    config
}
