//! Bounded retries around the embedding oracle.

use std::thread;
use std::time::Duration;

use log::warn;
use moca_core::{EmbeddingOracle, OracleError};

use crate::error::OptionsError;

/// Default number of attempts per embedding request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// How often, and how patiently, to retry a transient oracle failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy making a single attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Set the total number of attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the pause between attempts.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Check the policy allows at least one attempt.
    ///
    /// # Errors
    /// Returns [`OptionsError::ZeroAttempts`] when `max_attempts` is zero.
    pub const fn validate(&self) -> Result<(), OptionsError> {
        if self.max_attempts == 0 {
            return Err(OptionsError::ZeroAttempts);
        }
        Ok(())
    }
}

/// Oracle wrapper that retries transient failures.
///
/// Only errors for which [`OracleError::is_retryable`] holds are retried;
/// the last error is returned once the attempts run out.
#[derive(Debug, Clone)]
pub struct RetryingOracle<O> {
    inner: O,
    policy: RetryPolicy,
}

impl<O> RetryingOracle<O> {
    /// Wrap `inner` with `policy`.
    pub const fn new(inner: O, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<O: EmbeddingOracle> EmbeddingOracle for RetryingOracle<O> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.embed(text) {
                Err(err) if err.is_retryable() && attempt < attempts => {
                    warn!("embedding '{text}' failed (attempt {attempt}/{attempts}): {err}");
                    if !self.policy.delay.is_zero() {
                        thread::sleep(self.policy.delay);
                    }
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moca_core::test_support::{CountingOracle, FailingOracle, FlakyOracle, StubOracle};
    use rstest::rstest;

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(attempts)
            .with_delay(Duration::ZERO)
    }

    #[rstest]
    fn recovers_from_transient_failures() {
        let stub = StubOracle::new(1).with_default(vec![1.0]);
        let timeout = OracleError::Timeout {
            endpoint: "stub://oracle".into(),
            timeout_secs: 1,
        };
        let flaky = FlakyOracle::new(stub, 2, timeout);
        let oracle = RetryingOracle::new(flaky, quick(3));
        assert_eq!(oracle.embed("tram"), Ok(vec![1.0]));
    }

    #[rstest]
    fn gives_up_after_max_attempts() {
        let counting = CountingOracle::new(FailingOracle::timing_out());
        let oracle = RetryingOracle::new(counting.clone(), quick(3));
        assert!(matches!(oracle.embed("tram"), Err(OracleError::Timeout { .. })));
        assert_eq!(counting.calls_for("tram"), 3);
    }

    #[rstest]
    fn permanent_failures_are_not_retried() {
        let counting = CountingOracle::new(StubOracle::new(1));
        let oracle = RetryingOracle::new(counting.clone(), quick(5));
        assert!(matches!(oracle.embed("tram"), Err(OracleError::Http { status: 404, .. })));
        assert_eq!(counting.total_calls(), 1);
    }

    #[rstest]
    #[case(RetryPolicy::default(), Ok(()))]
    #[case(RetryPolicy::no_retry(), Ok(()))]
    #[case(RetryPolicy::default().with_max_attempts(0), Err(OptionsError::ZeroAttempts))]
    fn validates_attempt_count(#[case] policy: RetryPolicy, #[case] expected: Result<(), OptionsError>) {
        assert_eq!(policy.validate(), expected);
    }

    #[rstest]
    fn defaults_match_documented_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }
}
