//! Reusable retry policy for provider calls.
//!
//! Bounded attempts with linearly increasing wait, decoupled from the
//! business logic it wraps. Exhaustion returns an explicit error; callers
//! decide how to degrade.

use std::time::Duration;

use tracing::warn;
use verdict_core::errors::{ProviderError, VerdictError, VerdictResult};

/// Retry policy: `max_attempts` tries, attempt `n` waits `n * base_delay`
/// before retrying.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Build a policy from per-provider config fields.
    pub fn from_config(max_retries: usize, backoff_base_secs: u64) -> Self {
        Self::new(max_retries, Duration::from_secs(backoff_base_secs))
    }

    /// Run `op`, retrying on failure until the attempt budget is spent.
    pub fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> VerdictResult<T>,
    ) -> VerdictResult<T> {
        let mut last_error: Option<VerdictError> = None;

        for attempt in 1..=self.max_attempts {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) => {
                    warn!(
                        what,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "provider call failed"
                    );
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        std::thread::sleep(self.base_delay * attempt as u32);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RetriesExhausted {
                provider: what.to_string(),
                attempts: self.max_attempts,
            }
            .into()
        }))
    }
}
