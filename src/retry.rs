//! Retry with exponential backoff around provider calls.
//!
//! The two network operations in the pipeline each carry their own policy:
//! the author fetch gets a longer leash than per-publication expansion,
//! since its failure is fatal to the run.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff policy. The delay doubles after each failed attempt,
/// saturating at `cap`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Delay before the second attempt
    pub base: Duration,
    /// Upper bound on any single delay
    pub cap: Duration,
    /// Total attempts, including the first
    pub max_attempts: u32,
}

/// Author profile fetch: failure aborts the run, so retry hard.
pub const AUTHOR_BACKOFF: Backoff = Backoff {
    base: Duration::from_secs(1),
    cap: Duration::from_secs(60),
    max_attempts: 6,
};

/// Per-publication expansion: failure only skips one item.
pub const PUBLICATION_BACKOFF: Backoff = Backoff {
    base: Duration::from_secs(1),
    cap: Duration::from_secs(30),
    max_attempts: 5,
};

/// Run `op` until it succeeds or the policy's attempts are exhausted.
///
/// Returns the first `Ok`, or the error from the final attempt.
pub async fn retry<T, F, Fut>(policy: Backoff, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    let mut delay = policy.base;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_attempts => return Err(e),
            Err(e) => {
                warn!(
                    label,
                    attempt,
                    max_attempts = policy.max_attempts,
                    wait_secs = delay.as_secs_f64(),
                    error = %e,
                    "Attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.cap);
                attempt += 1;
            }
        }
    }
}
