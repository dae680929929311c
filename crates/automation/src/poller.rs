//! Bounded-retry readiness polling.
//!
//! The remote page gives no notifications, so every wait is a predicate
//! evaluated on a fixed interval until it holds or the attempt budget runs out.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use crate::error::AutomationError;

/// How often and how many times a condition is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls forever.
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    /// At most `max_attempts` evaluations (never fewer than one).
    #[must_use]
    pub const fn bounded(interval: Duration, max_attempts: u32) -> Self {
        let max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        Self { interval, max_attempts: Some(max_attempts) }
    }

    #[must_use]
    pub const fn unbounded(interval: Duration) -> Self {
        Self { interval, max_attempts: None }
    }

    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.max_attempts.is_some()
    }
}

/// Result of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts } | Self::TimedOut { attempts } => *attempts,
        }
    }

    /// Converts a timeout into [`AutomationError::Timeout`] naming `what`.
    ///
    /// # Errors
    /// Returns `AutomationError::Timeout` when the wait did not succeed.
    pub fn into_result(self, what: &str) -> Result<u32, AutomationError> {
        match self {
            Self::Ready { attempts } => Ok(attempts),
            Self::TimedOut { attempts } => {
                Err(AutomationError::Timeout { what: what.to_owned(), attempts })
            },
        }
    }
}

/// Evaluates `predicate` until it returns `true`.
///
/// After each `false` the task sleeps for one interval. A bounded policy
/// with `n` attempts evaluates exactly `n` times before timing out.
pub async fn wait_until<F, Fut>(policy: PollPolicy, mut predicate: F) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let outcome =
        try_wait_until(policy, || {
            let fut = predicate();
            async move { Ok::<_, Infallible>(fut.await) }
        })
        .await;
    match outcome {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

/// Like [`wait_until`] for a fallible predicate; the first error aborts the wait.
///
/// # Errors
/// Returns the predicate's error as soon as one evaluation fails.
pub async fn try_wait_until<F, Fut, E>(policy: PollPolicy, mut predicate: F) -> Result<PollOutcome, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        if predicate().await? {
            return Ok(PollOutcome::Ready { attempts });
        }
        tracing::debug!(attempts, "Condition not met yet");
        tokio::time::sleep(policy.interval).await;
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Ok(PollOutcome::TimedOut { attempts });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    const INTERVAL: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_never_true_times_out_after_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let started = tokio::time::Instant::now();

        let outcome = wait_until(PollPolicy::bounded(INTERVAL, 3), || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await;

        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 3 });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_attempt_does_not_sleep() {
        let started = tokio::time::Instant::now();
        let outcome = wait_until(PollPolicy::bounded(INTERVAL, 5), || async { true }).await;
        assert_eq!(outcome, PollOutcome::Ready { attempts: 1 });
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_becomes_ready_midway() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let outcome = wait_until(PollPolicy::bounded(INTERVAL, 20), || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { n >= 4 }
        })
        .await;

        assert_eq!(outcome, PollOutcome::Ready { attempts: 4 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_keeps_polling() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let outcome = wait_until(PollPolicy::unbounded(INTERVAL), || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { n == 500 }
        })
        .await;

        assert_eq!(outcome.attempts(), 500);
        assert!(outcome.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_evaluates_once() {
        let policy = PollPolicy::bounded(INTERVAL, 0);
        assert_eq!(policy.max_attempts, Some(1));
        let outcome = wait_until(policy, || async { false }).await;
        assert_eq!(outcome.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_error_aborts_wait() {
        let result: Result<PollOutcome, &str> =
            try_wait_until(PollPolicy::bounded(INTERVAL, 10), || async { Err("gone") }).await;
        assert_eq!(result, Err("gone"));
    }

    #[test]
    fn test_timeout_converts_to_error() {
        let err = PollOutcome::TimedOut { attempts: 20 }.into_result("option").unwrap_err();
        assert_eq!(err, AutomationError::Timeout { what: "option".to_owned(), attempts: 20 });
        assert_eq!(PollOutcome::Ready { attempts: 2 }.into_result("x"), Ok(2));
    }
}
