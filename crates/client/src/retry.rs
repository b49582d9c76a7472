//! Retry policy: pure backoff and retry predicates plus the retry loop

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use uplink_core::{ErrorKind, RequestOutcome, Sleeper};

/// Delay to wait before the given attempt (1-based).
///
/// The first attempt starts immediately; attempt k (k >= 2) waits
/// `2^(k-2)` seconds: 1s, 2s, 4s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    if attempt <= 1 {
        return Duration::ZERO;
    }
    // Cap the exponent so the shift cannot overflow; delays this long are
    // never reached with realistic attempt budgets.
    let exponent = (attempt - 2).min(16);
    Duration::from_millis(1000u64 << exponent)
}

/// Whether a failed attempt with this classification is worth retrying
pub fn should_retry(kind: ErrorKind) -> bool {
    kind.is_retryable()
}

/// Run `operation` up to `attempts` times, sleeping with exponential
/// backoff between attempts.
///
/// The operation receives the 1-based attempt number. Only transient
/// failures (network, timeout) are retried; the final attempt's outcome is
/// returned either way, so callers always see exactly one outcome.
pub async fn run_with_retry<F, Fut>(
    attempts: u32,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> RequestOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = RequestOutcome>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        let outcome = operation(attempt).await;
        if outcome.success || !should_retry(outcome.error_kind) || attempt >= attempts {
            return outcome;
        }

        attempt += 1;
        let delay = backoff_delay(attempt);
        debug!(
            attempt,
            max_attempts = attempts,
            delay_ms = delay.as_millis() as u64,
            kind = %outcome.error_kind,
            "Retrying after transient failure"
        );
        sleeper.sleep(delay).await;
    }
}

/// Default sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
