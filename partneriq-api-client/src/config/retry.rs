//! Retry policy and exponential backoff.
//!
//! The retry system consists of:
//! - [`RetryPolicy`]: configuration for retry behavior (attempt budget,
//!   backoff timing, which status codes are considered transient)
//! - [`ExponentialBackoff`]: iterator that yields jittered sleep durations
//!
//! The schedule is power-of-two: `min(base * 2^(attempt-1), max)` perturbed
//! by ±`jitter` uniform multiplicative noise. Jitter decorrelates clients
//! that fail at the same instant so their retries do not arrive as a storm.
//!
//! # Retryable Conditions
//!
//! Only transient failures are retried:
//! - No HTTP response at all (connection refused, DNS failure, reset)
//! - Client-side timeout
//! - A response whose status is in the policy's retryable set
//!   (default {500, 502, 503, 504, 408, 429})
//!
//! Every other received status fails immediately without retry.

use std::collections::HashSet;
use std::time::Duration;

use http::StatusCode;
use rand::Rng;

/// Default configuration values.
pub mod defaults {
    use std::time::Duration;

    /// Default initial delay before the first retry.
    pub const BASE_DELAY: Duration = Duration::from_secs(1);

    /// Default jitter factor (0.25 means ±25%).
    pub const JITTER: f64 = 0.25;

    /// Default maximum delay between retries.
    pub const MAX_DELAY: Duration = Duration::from_secs(30);

    /// Default maximum number of retries (not counting the initial attempt).
    pub const MAX_RETRIES: u32 = 3;

    /// Status codes treated as transient by default.
    pub const RETRYABLE_STATUSES: [u16; 6] = [500, 502, 503, 504, 408, 429];
}

/// Configuration for retry behavior.
///
/// # Example
///
/// ```
/// use partneriq_api_client::RetryPolicy;
/// use std::time::Duration;
///
/// // Use defaults
/// let policy = RetryPolicy::default();
///
/// // Custom configuration
/// let policy = RetryPolicy::new()
///     .max_retries(5)
///     .base_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(10));
/// ```
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Initial delay before the first retry.
    pub base_delay: Duration,

    /// Jitter factor for randomizing delays. Value between 0.0 and 1.0.
    /// A value of 0.25 means the actual delay lies within ±25% of the
    /// computed delay.
    pub jitter: f64,

    /// Maximum delay between retries (applied before jitter).
    pub max_delay: Duration,

    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,

    /// Status codes considered transient.
    pub retryable_statuses: HashSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: defaults::BASE_DELAY,
            jitter: defaults::JITTER,
            max_delay: defaults::MAX_DELAY,
            max_retries: defaults::MAX_RETRIES,
            retryable_statuses: defaults::RETRYABLE_STATUSES.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// Create a new RetryPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a retry policy that never retries.
    ///
    /// Useful for disabling retries while keeping the retry infrastructure.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Create a retry policy for aggressive retrying.
    ///
    /// Uses shorter delays suitable for latency-sensitive interactive calls.
    /// - Base delay: 50ms
    /// - Max delay: 1 second
    /// - Max retries: 5
    pub fn aggressive() -> Self {
        Self {
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            max_retries: 5,
            ..Default::default()
        }
    }

    /// Create a retry policy for patient retrying.
    ///
    /// Uses longer delays suitable for background work.
    /// - Base delay: 2 seconds
    /// - Max delay: 5 minutes
    /// - Max retries: 10
    pub fn patient() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(300),
            max_retries: 10,
            ..Default::default()
        }
    }

    /// Set the maximum number of retry attempts.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initial delay before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter factor.
    ///
    /// # Panics
    ///
    /// Panics if `jitter` is not between 0.0 and 1.0.
    pub fn jitter(mut self, jitter: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&jitter),
            "jitter must be between 0.0 and 1.0"
        );
        self.jitter = jitter;
        self
    }

    /// Replace the set of status codes considered transient.
    pub fn retryable_statuses<I: IntoIterator<Item = u16>>(mut self, statuses: I) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Whether a received status is considered transient by this policy.
    pub fn retries_on(&self, status: StatusCode) -> bool {
        self.retryable_statuses.contains(&status.as_u16())
    }

    /// Total attempt budget: the initial try plus up to `max_retries`
    /// retries.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Validate the policy configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.base_delay > self.max_delay {
            return Err("base_delay must not exceed max_delay");
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err("jitter must be between 0.0 and 1.0");
        }
        Ok(())
    }

    /// Create an ExponentialBackoff iterator from this policy.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.clone())
    }
}

/// Exponential backoff iterator with jitter.
///
/// Yields doubling sleep durations with randomized jitter, capped at the
/// policy's `max_delay` before the jitter is applied.
///
/// # Example
///
/// ```
/// use partneriq_api_client::RetryPolicy;
///
/// let policy = RetryPolicy::new().jitter(0.0); // No jitter for predictable output
/// let mut backoff = policy.backoff();
///
/// // First delay is the base delay, then it doubles
/// let delay1 = backoff.next_delay();
/// let delay2 = backoff.next_delay();
/// assert_eq!(delay2, delay1 * 2);
/// ```
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    /// Current delay without jitter, stored as f64 to avoid rounding errors.
    current_delay_secs: f64,
    /// Number of attempts made.
    attempts: u32,
}

impl ExponentialBackoff {
    /// Create a new ExponentialBackoff from a RetryPolicy.
    pub fn new(policy: RetryPolicy) -> Self {
        let current_delay_secs = policy.base_delay.as_secs_f64();
        Self {
            policy,
            current_delay_secs,
            attempts: 0,
        }
    }

    /// Reset the backoff to its initial state.
    pub fn reset(&mut self) {
        self.current_delay_secs = self.policy.base_delay.as_secs_f64();
        self.attempts = 0;
    }

    /// Get the number of attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Check if more retries are allowed.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.policy.max_retries
    }

    /// Get the next delay duration, applying the cap and then jitter.
    ///
    /// Advances the internal state for the next call.
    pub fn next_delay(&mut self) -> Duration {
        // Cap before jitter so the bound holds: result lies within
        // ±jitter of min(base * 2^n, max).
        let capped = self
            .current_delay_secs
            .min(self.policy.max_delay.as_secs_f64());

        let jittered = if self.policy.jitter > 0.0 {
            let factor =
                1.0 + rand::rng().random_range(-self.policy.jitter..=self.policy.jitter);
            capped * factor
        } else {
            capped
        };

        self.current_delay_secs *= 2.0;
        self.attempts += 1;

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert!((policy.jitter - 0.25).abs() < f64::EPSILON);
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.max_attempts(), 4);
        for status in [500u16, 502, 503, 504, 408, 429] {
            assert!(policy.retries_on(StatusCode::from_u16(status).unwrap()));
        }
        for status in [400u16, 401, 403, 404, 422] {
            assert!(!policy.retries_on(StatusCode::from_u16(status).unwrap()));
        }
    }

    #[test]
    fn test_retry_policy_no_retry() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_retry_policy_aggressive() {
        let policy = RetryPolicy::aggressive();
        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_secs(1));
        assert_eq!(policy.max_retries, 5);
    }

    #[test]
    fn test_retry_policy_patient() {
        let policy = RetryPolicy::patient();
        assert_eq!(policy.base_delay, Duration::from_secs(2));
        assert_eq!(policy.max_delay, Duration::from_secs(300));
        assert_eq!(policy.max_retries, 10);
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::new()
            .max_retries(5)
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_secs(10))
            .jitter(0.1)
            .retryable_statuses([503, 429]);

        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(100));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        assert!((policy.jitter - 0.1).abs() < f64::EPSILON);
        assert!(policy.retries_on(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!policy.retries_on(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_retry_policy_validate() {
        let valid = RetryPolicy::default();
        assert!(valid.validate().is_ok());

        let invalid = RetryPolicy {
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
            ..Default::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "jitter must be between 0.0 and 1.0")]
    fn test_retry_policy_invalid_jitter() {
        RetryPolicy::new().jitter(1.5);
    }

    #[test]
    fn test_exponential_backoff_no_jitter() {
        let policy = RetryPolicy::new()
            .base_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(100))
            .jitter(0.0);

        let mut backoff = policy.backoff();

        assert_eq!(backoff.attempts(), 0);
        assert!(backoff.can_retry());

        // First delay is base_delay, then it doubles each round
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.attempts(), 1);
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(8));
    }

    #[test]
    fn test_exponential_backoff_max_delay_clamping() {
        let policy = RetryPolicy::new()
            .base_delay(Duration::from_secs(10))
            .max_delay(Duration::from_secs(15))
            .jitter(0.0);

        let mut backoff = policy.backoff();

        // First: 10s
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
        // Second: would be 20s, clamped to 15s
        assert_eq!(backoff.next_delay(), Duration::from_secs(15));
        // Third: still clamped
        assert_eq!(backoff.next_delay(), Duration::from_secs(15));
    }

    #[test]
    fn test_exponential_backoff_jitter_bounds() {
        let policy = RetryPolicy::new()
            .base_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(100))
            .jitter(0.25);

        // Delay N must lie within [0.75, 1.25] * base * 2^(N-1)
        for _ in 0..50 {
            let mut backoff = policy.backoff();
            for n in 0..4u32 {
                let expected = 2f64.powi(n as i32);
                let delay = backoff.next_delay().as_secs_f64();
                assert!(
                    delay >= 0.75 * expected && delay <= 1.25 * expected,
                    "attempt {n}: {delay} outside [{}, {}]",
                    0.75 * expected,
                    1.25 * expected
                );
            }
        }
    }

    #[test]
    fn test_exponential_backoff_reset() {
        let policy = RetryPolicy::new()
            .base_delay(Duration::from_secs(1))
            .jitter(0.0)
            .max_retries(5);

        let mut backoff = policy.backoff();

        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.attempts(), 2);

        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_backoff_can_retry() {
        let policy = RetryPolicy::new().max_retries(2).jitter(0.0);
        let mut backoff = policy.backoff();

        assert!(backoff.can_retry()); // 0 attempts
        backoff.next_delay();
        assert!(backoff.can_retry()); // 1 attempt
        backoff.next_delay();
        assert!(!backoff.can_retry()); // 2 attempts (max)
    }
}
