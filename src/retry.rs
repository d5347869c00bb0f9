//! Retry envelope for API operations.
//!
//! [`execute`] repeatedly invokes an operation until it returns a result the
//! caller accepts, the attempt budget runs out, or the wall-clock budget runs
//! out. Transport failures are swallowed until the last permitted attempt;
//! every other error propagates immediately.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{LfError, Result};

/// Delay added after each attempt, as a function of the 1-based attempt index.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// `log10(attempt)` seconds: nothing after the first attempt, one second after the tenth.
    #[default]
    Logarithmic,
    /// The same increment after every attempt.
    Constant(#[serde(with = "duration_secs")] Duration),
    /// Keep the initial delay forever.
    None,
}

impl Backoff {
    pub fn increment(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Logarithmic => {
                let secs = f64::from(attempt.max(1)).log10();
                Duration::from_secs_f64(secs.max(0.0))
            }
            Backoff::Constant(step) => *step,
            Backoff::None => Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// `None` means attempts are bounded only by `max_wall_time`.
    pub max_attempts: Option<u32>,
    #[serde(with = "duration_secs")]
    pub max_wall_time: Duration,
    #[serde(with = "duration_secs")]
    pub initial_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Three attempts within two hours.
    fn default() -> Self {
        Self {
            max_attempts: Some(3),
            max_wall_time: Duration::from_secs(2 * 60 * 60),
            initial_delay: Duration::from_secs(1),
            backoff: Backoff::Logarithmic,
        }
    }
}

impl RetryPolicy {
    /// Unbounded attempts within 90 minutes; used to wait for fetch jobs.
    pub fn job_polling() -> Self {
        Self {
            max_attempts: None,
            max_wall_time: Duration::from_secs(90 * 60),
            initial_delay: Duration::from_secs(1),
            backoff: Backoff::Logarithmic,
        }
    }

    /// A single attempt, no waiting.
    pub fn once() -> Self {
        Self {
            max_attempts: Some(1),
            initial_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_wall_time(mut self, max_wall_time: Duration) -> Self {
        self.max_wall_time = max_wall_time;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == Some(0) {
            return Err(LfError::InvalidPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_wall_time.is_zero() {
            return Err(LfError::InvalidPolicy(
                "max_wall_time must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn allows_attempt(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }

    fn is_last_attempt(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Delay slept before attempt `attempt + 1`, for `attempt >= 1`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        (1..=attempt).fold(self.initial_delay, |delay, n| delay + self.backoff.increment(n))
    }
}

/// Runs `operation` under `policy` until it succeeds and `retry_if` (when
/// given) rejects the result.
///
/// `retry_if` returning `true` means "successful, but not done yet". When
/// the budgets run out before an accepted result, the call fails with
/// [`LfError::RetryExhausted`]; a transport failure from the final attempt
/// is returned as is, whether it ran out of attempts or of time.
#[tracing::instrument(skip(operation, retry_if))]
pub async fn execute<T, F, Fut, C>(
    operation_name: &str,
    policy: &RetryPolicy,
    operation: F,
    retry_if: Option<C>,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&T) -> bool,
{
    policy.validate()?;

    let start = Instant::now();
    let mut attempts: u32 = 0;
    let mut delay = policy.initial_delay;
    let mut last_error: Option<LfError> = None;

    while start.elapsed() < policy.max_wall_time && policy.allows_attempt(attempts) {
        if attempts > 0 {
            debug!("{}: waiting {:?} before attempt {}", operation_name, delay, attempts + 1);
            tokio::time::sleep(delay).await;
            if start.elapsed() >= policy.max_wall_time {
                break;
            }
        }

        attempts += 1;
        match operation().await {
            Ok(result) => {
                let keep_going = retry_if.as_ref().is_some_and(|retry| retry(&result));
                if !keep_going {
                    return Ok(result);
                }
                last_error = None;
                debug!("{}: attempt {} not finished yet", operation_name, attempts);
            }
            Err(e) if e.is_transport() => {
                if policy.is_last_attempt(attempts) {
                    debug!("{}: giving up after {} attempt(s): {}", operation_name, attempts, e);
                    return Err(e);
                }
                warn!("{}: attempt {} failed ({}), retrying...", operation_name, attempts, e);
                last_error = Some(e);
            }
            Err(e) => {
                debug!("{}: non-retryable error: {}", operation_name, e);
                return Err(e);
            }
        }

        delay += policy.backoff.increment(attempts);
    }

    if let Some(e) = last_error {
        debug!("{}: out of time after {} attempt(s): {}", operation_name, attempts, e);
        return Err(e);
    }

    Err(LfError::RetryExhausted {
        attempts,
        elapsed: start.elapsed(),
    })
}

/// Convenience for [`execute`] without a retry condition.
pub async fn with_retry<T, F, Fut>(operation_name: &str, policy: &RetryPolicy, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    execute(operation_name, policy, operation, None::<fn(&T) -> bool>).await
}

/// Durations are written as (possibly fractional) seconds in profiles.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
