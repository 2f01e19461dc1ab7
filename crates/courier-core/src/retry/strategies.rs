//! Backoff delay calculation and retry predicates
//!
//! The delay sequence is strictly multiplicative: `d, d*b, d*b^2, ...`.
//! Predicates decide whether a failure is worth another attempt.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{Error, ErrorKind};
use crate::types::RetryPolicy;

/// Calculate the delay to wait after a failed attempt
///
/// # Arguments
///
/// * `policy` - The retry policy containing timing parameters
/// * `attempt` - The attempt that just failed (1-indexed)
///
/// # Example
///
/// ```rust
/// use courier_core::retry::calculate_delay;
/// use courier_core::types::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0).unwrap();
///
/// assert_eq!(calculate_delay(&policy, 1), Duration::from_secs(1));
/// assert_eq!(calculate_delay(&policy, 2), Duration::from_secs(2));
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    // Attempt is 1-indexed, the exponent is not
    let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let factor = policy.backoff_multiplier().powi(exponent);
    let secs = policy.initial_delay().as_secs_f64() * factor;

    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// A predicate that determines whether an error should be retried
///
/// # Example
///
/// ```rust
/// use courier_core::retry::RetryPredicate;
/// use std::io::{Error, ErrorKind};
///
/// struct IoRetryPredicate;
///
/// impl RetryPredicate<Error> for IoRetryPredicate {
///     fn should_retry(&self, error: &Error) -> bool {
///         matches!(error.kind(), ErrorKind::TimedOut | ErrorKind::ConnectionReset)
///     }
/// }
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given error should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that always returns true (all errors are retryable)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// A predicate that never retries (no errors are retryable)
#[derive(Debug, Clone, Copy)]
pub struct NeverRetry;

impl<E: ?Sized> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// A predicate that uses a closure to determine retryability
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    /// Create a new closure-based predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// Errors that can report their [`ErrorKind`]
pub trait ClassifiedError {
    /// The failure kind of this error
    fn error_kind(&self) -> ErrorKind;
}

impl ClassifiedError for Error {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }
}

/// A predicate that retries a fixed set of error kinds
///
/// The default set is `{Network}`.
#[derive(Debug, Clone)]
pub struct KindPredicate {
    kinds: HashSet<ErrorKind>,
}

impl KindPredicate {
    /// Retry only the given kinds
    pub fn new(kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Retry transport failures only
    pub fn network() -> Self {
        Self::new([ErrorKind::Network])
    }

    /// Whether the kind is in the retryable set
    pub fn is_retryable_kind(&self, kind: ErrorKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl Default for KindPredicate {
    fn default() -> Self {
        Self::network()
    }
}

impl<E: ClassifiedError> RetryPredicate<E> for KindPredicate {
    fn should_retry(&self, error: &E) -> bool {
        self.is_retryable_kind(error.error_kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn policy(initial_ms: u64, multiplier: f64) -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_millis(initial_ms), multiplier).unwrap()
    }

    #[test]
    fn test_exponential_delays() {
        let policy = policy(1000, 2.0);

        // attempt 1: 1000 * 2^0
        assert_eq!(calculate_delay(&policy, 1), Duration::from_millis(1000));
        // attempt 2: 1000 * 2^1
        assert_eq!(calculate_delay(&policy, 2), Duration::from_millis(2000));
        // attempt 3: 1000 * 2^2
        assert_eq!(calculate_delay(&policy, 3), Duration::from_millis(4000));
        assert_eq!(calculate_delay(&policy, 4), Duration::from_millis(8000));
    }

    #[test]
    fn test_unit_multiplier_is_fixed_delay() {
        let policy = policy(500, 1.0);
        for attempt in 1..=5 {
            assert_eq!(calculate_delay(&policy, attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_custom_multiplier() {
        let policy = policy(100, 3.0);
        assert_eq!(calculate_delay(&policy, 3), Duration::from_millis(900));
    }

    #[test]
    fn test_huge_exponent_saturates() {
        let policy = policy(1000, 10.0);
        assert_eq!(calculate_delay(&policy, u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_always_and_never() {
        let error = io::Error::new(io::ErrorKind::NotFound, "not found");
        assert!(AlwaysRetry.should_retry(&error));
        assert!(!NeverRetry.should_retry(&error));
    }

    #[test]
    fn test_closure_predicate() {
        let predicate = ClosurePredicate::new(|err: &io::Error| {
            matches!(
                err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
            )
        });

        assert!(predicate.should_retry(&io::Error::new(io::ErrorKind::TimedOut, "timeout")));
        assert!(!predicate.should_retry(&io::Error::new(io::ErrorKind::NotFound, "missing")));
    }

    #[test]
    fn test_kind_predicate_defaults_to_network() {
        let predicate = KindPredicate::default();

        assert!(predicate.should_retry(&Error::network("connection reset")));
        assert!(!predicate.should_retry(&Error::notification("webhook url not configured")));
        assert!(!predicate.should_retry(&Error::validation("PLATFORMS", "empty")));
        assert!(!predicate.should_retry(&Error::config_not_found("config.yaml")));
        assert!(!predicate.should_retry(&Error::data_processing("bad payload")));
    }

    #[test]
    fn test_kind_predicate_custom_set() {
        let predicate = KindPredicate::new([ErrorKind::Network, ErrorKind::DataProcessing]);
        assert!(predicate.should_retry(&Error::data_processing("truncated body")));
        assert!(!predicate.should_retry(&Error::other("unknown")));
    }
}
