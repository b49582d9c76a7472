use crate::models::environment::EnvironmentConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pass/fail verdict of a single diagnostic check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub passed: bool,
    pub details: String,
}

/// One named entry in a diagnostic report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEntry {
    pub name: String,
    #[serde(flatten)]
    pub result: CheckResult,
}

/// Structured result of one diagnostic run.
///
/// Checks are stored as an ordered list: the position in `checks` is the
/// fixed order the battery ran in, which is part of the contract with the
/// presentation surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub timestamp: DateTime<Utc>,
    pub environment: EnvironmentConfig,
    pub checks: Vec<CheckEntry>,
}

impl DiagnosticReport {
    pub fn new(environment: EnvironmentConfig) -> Self {
        Self {
            timestamp: Utc::now(),
            environment,
            checks: Vec::new(),
        }
    }

    /// Append a check result, keeping run order.
    pub fn record(&mut self, name: impl Into<String>, passed: bool, details: impl Into<String>) {
        self.checks.push(CheckEntry {
            name: name.into(),
            result: CheckResult {
                passed,
                details: details.into(),
            },
        });
    }

    /// Look up a check by name.
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.result)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|entry| entry.result.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|entry| entry.result.passed)
    }
}
