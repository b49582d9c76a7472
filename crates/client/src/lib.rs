pub mod classify;
pub mod client;
pub mod environment;
pub mod request;
pub mod retry;

pub use classify::{signals_from_transport_error, ClassifierConfig, RuleClassifier};
pub use client::{ApiClient, ApiClientBuilder};
pub use environment::{resolve, HOSTING_SUFFIXES};
pub use request::{Payload, RequestOverrides, RequestSpec};
pub use retry::{backoff_delay, run_with_retry, should_retry, TokioSleeper};
