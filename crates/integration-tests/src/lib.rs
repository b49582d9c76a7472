//! Integration tests for the uplink workspace.
//!
//! Shared helpers live in [`common`]; the suites themselves are under
//! `tests/`.

pub mod common;

pub use serde_json::{json, Value};
pub use uplink_client::{ApiClient, RequestSpec};
pub use uplink_core::{Environment, EnvironmentConfig, ErrorKind, Origin};
pub use uplink_diagnostics::{Diagnostics, StaticTokens};
