//! Bounded retry for flaky data services.
//!
//! The METAR and SYNOP services occasionally return truncated tables. A fetch
//! is simply repeated after a fixed delay until it succeeds or the attempt
//! budget is spent.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FetchError, Result};

/// How often and how patiently a fetch is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of tries, including the first
    pub max_attempts: u32,
    /// Pause between tries
    #[serde(with = "duration_secs")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Run `op` under this policy.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        attempt(self.max_attempts, self.delay, op).await
    }
}

/// Call `op` until it succeeds, at most `max_attempts` times.
///
/// Every error is retried. After the last failed try the error is wrapped in
/// [`FetchError::RetriesExhausted`]; there is no delay after the final try.
pub async fn attempt<T, F, Fut>(max_attempts: u32, delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if max_attempts == 0 {
        return Err(FetchError::InvalidRetryPolicy(
            "at least one attempt is required".to_string(),
        ));
    }

    let mut tries = 0;
    loop {
        tries += 1;
        match op().await {
            Ok(value) => {
                if tries > 1 {
                    debug!(attempt = tries, "Fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if tries >= max_attempts => {
                return Err(FetchError::RetriesExhausted {
                    attempts: tries,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                warn!(
                    error = %e,
                    attempt = tries,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_first_success_calls_once() {
        let calls = Cell::new(0);
        let result = attempt(3, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, FetchError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_is_invalid() {
        let calls = Cell::new(0);
        let result = attempt(0, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, FetchError>(()) }
        })
        .await;
        assert!(matches!(result, Err(FetchError::InvalidRetryPolicy(_))));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 6);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }
}
