use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed pause between consecutive attempts.
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(3))
    }
}

/// Run `op` until it succeeds or the policy is exhausted, returning the last error.
///
/// No pause follows the final failed attempt.
pub async fn retry_async<T, E, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                info!(attempt, "{what} succeeded");
                return Ok(value);
            }
            Err(e) if attempt < attempts => {
                warn!(attempt, max_attempts = attempts, error = %e, "{what} failed, retrying");
                tokio::time::sleep(policy.interval).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(attempt, max_attempts = attempts, error = %e, "{what} failed, giving up");
                return Err(e);
            }
        }
    }
}
