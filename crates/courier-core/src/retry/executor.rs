//! Retry execution engine
//!
//! This module provides the core retry execution logic with a configurable
//! policy, predicate, observer and retry callback.

use std::error::Error;
use std::future::Future;

use tokio::time::Instant;

use crate::types::RetryPolicy;

use super::error::RetryError;
use super::observer::{RetryEvent, RetryObserver};
use super::strategies::{calculate_delay, ClassifiedError, KindPredicate, RetryPredicate};

/// Callback invoked with `(error, attempt)` before each backoff wait
pub type RetryCallback = Box<dyn Fn(&dyn Error, u32) + Send + Sync>;

/// Result of a single attempt
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    /// The operation returned a value
    Success(T),
    /// The operation failed on the given attempt
    Failure { error: E, attempt: u32 },
}

impl<T, E> AttemptOutcome<T, E> {
    /// Tag an operation result with its attempt number
    pub fn from_result(result: Result<T, E>, attempt: u32) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(error) => AttemptOutcome::Failure { error, attempt },
        }
    }
}

/// Execute an async operation under a policy, retrying network-kind failures
///
/// This is a convenience function for simple retry scenarios. For more
/// control, use `RetryExecutorBuilder`.
///
/// # Example
///
/// ```rust,no_run
/// use courier_core::retry::retry_with_policy;
/// use courier_core::types::RetryPolicy;
/// use courier_core::Error;
///
/// async fn example() {
///     let policy = RetryPolicy::default();
///
///     let result = retry_with_policy(&policy, || async {
///         Ok::<_, Error>("delivered")
///     }).await;
/// }
/// ```
pub async fn retry_with_policy<F, Fut, T, E>(policy: &RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Error + ClassifiedError + 'static,
{
    RetryExecutorBuilder::new()
        .with_policy(policy.clone())
        .build()
        .execute(op)
        .await
}

/// Builder for configuring a `RetryExecutor`
///
/// # Example
///
/// ```rust
/// use courier_core::retry::{RetryExecutorBuilder, TracingObserver};
/// use courier_core::types::RetryPolicy;
///
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::default())
///     .with_observer(TracingObserver::new("webhook"))
///     .on_retry(|err, attempt| eprintln!("attempt {} failed: {}", attempt, err))
///     .build();
/// ```
pub struct RetryExecutorBuilder<P = KindPredicate, O = ()> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    on_retry: Option<RetryCallback>,
}

impl Default for RetryExecutorBuilder<KindPredicate, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<KindPredicate, ()> {
    /// Create a new builder: default policy, network-only predicate, no observer
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            predicate: KindPredicate::network(),
            observer: (),
            on_retry: None,
        }
    }
}

impl<P, O> RetryExecutorBuilder<P, O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the retry predicate
    ///
    /// The predicate determines whether an error should be retried.
    pub fn with_predicate<P2>(self, predicate: P2) -> RetryExecutorBuilder<P2, O> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate,
            observer: self.observer,
            on_retry: self.on_retry,
        }
    }

    /// Set the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<P, O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate: self.predicate,
            observer,
            on_retry: self.on_retry,
        }
    }

    /// Set a callback run on every non-final retryable failure
    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn Error, u32) + Send + Sync + 'static,
    {
        self.on_retry = Some(Box::new(callback));
        self
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<P, O> {
        RetryExecutor {
            policy: self.policy,
            predicate: self.predicate,
            observer: self.observer,
            on_retry: self.on_retry,
        }
    }
}

/// A retry executor with configurable policy, predicate, and observer
///
/// Use `RetryExecutorBuilder` to create an instance.
pub struct RetryExecutor<P, O> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    on_retry: Option<RetryCallback>,
}

impl<P, O> RetryExecutor<P, O>
where
    O: RetryObserver,
{
    /// The policy this executor applies
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic
    ///
    /// Returns the first successful value, or a `RetryError` carrying the
    /// last error unchanged.
    pub async fn execute<F, Fut, T, E>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
        P: RetryPredicate<E>,
    {
        self.execute_with_cancel(op, std::future::pending::<()>())
            .await
    }

    /// Execute an operation, aborting the backoff wait when `cancel` completes
    ///
    /// Cancellation is only observed between attempts; an attempt that is
    /// already running is allowed to finish.
    pub async fn execute_with_cancel<F, Fut, T, E, C>(
        &self,
        mut op: F,
        cancel: C,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
        P: RetryPredicate<E>,
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let start = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            self.observer.observe(&RetryEvent::Started {
                attempt,
                max_attempts,
            });

            let (err, failed_attempt) = match AttemptOutcome::from_result(op().await, attempt) {
                AttemptOutcome::Success(value) => {
                    self.observer.observe(&RetryEvent::Succeeded {
                        attempt,
                        elapsed: start.elapsed(),
                    });
                    return Ok(value);
                }
                AttemptOutcome::Failure { error, attempt } => (error, attempt),
            };

            if !self.predicate.should_retry(&err) {
                self.observer.observe(&RetryEvent::Rejected {
                    attempt: failed_attempt,
                    error: &err,
                });
                return Err(RetryError::non_retryable(failed_attempt, err));
            }

            if failed_attempt >= max_attempts {
                self.observer.observe(&RetryEvent::Exhausted {
                    attempts: failed_attempt,
                    error: &err,
                });
                return Err(RetryError::exhausted(
                    failed_attempt,
                    err,
                    start.elapsed(),
                ));
            }

            let delay = calculate_delay(&self.policy, failed_attempt);

            if let Some(callback) = &self.on_retry {
                callback(&err, failed_attempt);
            }
            self.observer.observe(&RetryEvent::Scheduled {
                attempt: failed_attempt,
                error: &err,
                delay,
            });

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut cancel => {
                    self.observer.observe(&RetryEvent::Cancelled {
                        attempt: failed_attempt,
                        error: &err,
                    });
                    return Err(RetryError::cancelled(failed_attempt, Some(err)));
                }
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::observer::StatsObserver;
    use crate::retry::strategies::{AlwaysRetry, ClosurePredicate};
    use crate::Error as CourierError;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(10), 2.0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let observer = Arc::new(StatsObserver::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy())
            .with_predicate(AlwaysRetry)
            .with_observer(observer.clone())
            .build()
            .execute(|| async { Ok("success") })
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(observer.attempt_starts(), 1);
        assert_eq!(observer.successes(), 1);
        assert_eq!(observer.retries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error() {
        let observer = Arc::new(StatsObserver::new());

        let predicate = ClosurePredicate::new(|err: &io::Error| err.kind() != io::ErrorKind::NotFound);

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(test_policy())
            .with_predicate(predicate)
            .with_observer(observer.clone())
            .build()
            .execute(|| async { Err(io::Error::new(io::ErrorKind::NotFound, "not found")) })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_non_retryable());
        assert_eq!(observer.attempt_starts(), 1);
        assert_eq!(observer.stops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_with_policy_retries_network_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = retry_with_policy(&test_policy(), || {
            let attempts = attempts_clone.clone();
            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 2 {
                    Err(CourierError::network("timeout"))
                } else {
                    Ok("delivered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "delivered");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_with_policy_stops_on_notification_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<(), _> = retry_with_policy(&test_policy(), || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CourierError::notification("webhook url not configured"))
            }
        })
        .await;

        assert!(result.unwrap_err().is_non_retryable());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_attempt_outcome_from_result() {
        let ok: AttemptOutcome<u8, &str> = AttemptOutcome::from_result(Ok(7), 1);
        assert!(matches!(ok, AttemptOutcome::Success(7)));

        let failed: AttemptOutcome<u8, &str> = AttemptOutcome::from_result(Err("boom"), 2);
        assert!(matches!(
            failed,
            AttemptOutcome::Failure {
                error: "boom",
                attempt: 2
            }
        ));
    }
}
