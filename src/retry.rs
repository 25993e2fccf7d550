//! Fixed-interval retry policy
//!
//! Shared by the search fetcher and the result writer. The operation receives
//! the zero-based attempt index so a call site can vary its input per attempt
//! (the writer picks a new filename each time).

use std::future::Future;
use std::time::Duration;

/// How many times to try an operation and how long to pause between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Pause between consecutive attempts (no jitter)
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a fixed-interval policy
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or runs out of attempts
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The first successful result
    /// * `Err(E)` - The last error observed
    pub async fn run<T, E, F, Fut, P>(&self, mut operation: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !is_retryable(&err) || attempt + 1 >= attempts {
                        return Err(err);
                    }
                    tracing::debug!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        "Retrying in {:?}",
                        self.delay
                    );
                }
            }

            attempt += 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
    }
}
