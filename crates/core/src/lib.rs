pub mod error;
pub mod models;
pub mod traits;

pub use error::{Error, ErrorCategory, ErrorContext, Result};

// Re-export commonly used models for convenience
pub use models::{
    environment::{Environment, EnvironmentConfig, Origin},
    outcome::{ErrorKind, RequestOutcome},
    report::{CheckEntry, CheckResult, DiagnosticReport},
};

pub use traits::{Classify, FailureSignals, Sleeper, TokenSource};
