//! Retry events and the observers that consume them
//!
//! The executor reports every step of a retry run as a [`RetryEvent`].
//! Observers are for logging and metrics only; they cannot influence whether
//! another attempt is made.

use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One step of a retry run
#[derive(Debug, Clone, Copy)]
pub enum RetryEvent<'a> {
    /// Attempt `attempt` of `max_attempts` is about to run
    Started { attempt: u32, max_attempts: u32 },
    /// A retryable failure; the next attempt runs after `delay`
    Scheduled {
        attempt: u32,
        error: &'a (dyn Error + 'static),
        delay: Duration,
    },
    /// The operation returned a value
    Succeeded { attempt: u32, elapsed: Duration },
    /// The final attempt failed with a retryable error
    Exhausted {
        attempts: u32,
        error: &'a (dyn Error + 'static),
    },
    /// The predicate rejected the error
    Rejected {
        attempt: u32,
        error: &'a (dyn Error + 'static),
    },
    /// The caller cancelled the backoff wait
    Cancelled {
        attempt: u32,
        error: &'a (dyn Error + 'static),
    },
}

/// Receives [`RetryEvent`]s from an executor
pub trait RetryObserver: Send + Sync {
    fn observe(&self, event: &RetryEvent<'_>);
}

/// Ignores every event
impl RetryObserver for () {
    fn observe(&self, _event: &RetryEvent<'_>) {}
}

impl<T: RetryObserver + ?Sized> RetryObserver for Arc<T> {
    fn observe(&self, event: &RetryEvent<'_>) {
        (**self).observe(event)
    }
}

/// Logs events with `tracing`
///
/// Start and first-try success are DEBUG, a scheduled retry and a stop are
/// WARN, success after retries is INFO, exhaustion is ERROR.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl RetryObserver for TracingObserver {
    fn observe(&self, event: &RetryEvent<'_>) {
        let operation = self.operation.as_str();

        match *event {
            RetryEvent::Started {
                attempt,
                max_attempts,
            } => {
                tracing::debug!(operation, attempt, max_attempts, "starting attempt");
            }
            RetryEvent::Scheduled {
                attempt,
                error,
                delay,
            } => {
                tracing::warn!(
                    operation,
                    attempt,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "attempt failed, will retry"
                );
            }
            RetryEvent::Succeeded { attempt, elapsed } if attempt > 1 => {
                tracing::info!(
                    operation,
                    attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "succeeded after retry"
                );
            }
            RetryEvent::Succeeded { .. } => {
                tracing::debug!(operation, "succeeded on first attempt");
            }
            RetryEvent::Exhausted { attempts, error } => {
                tracing::error!(operation, attempts, error = %error, "all retry attempts exhausted");
            }
            RetryEvent::Rejected { attempt, error } => {
                tracing::warn!(operation, attempt, error = %error, "error is not retryable, giving up");
            }
            RetryEvent::Cancelled { attempt, error } => {
                tracing::warn!(operation, attempt, error = %error, "retry cancelled by caller");
            }
        }
    }
}

/// Counts events and records every scheduled delay
#[derive(Debug, Default)]
pub struct StatsObserver {
    starts: AtomicU32,
    retries: AtomicU32,
    successes: AtomicU32,
    exhaustions: AtomicU32,
    stops: AtomicU32,
    delays: Mutex<Vec<Duration>>,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    /// Failures that were followed by another attempt
    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    /// Runs ended early by a rejected error or a cancelled wait
    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }

    /// Delays scheduled so far, in order
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|delays| delays.clone())
            .unwrap_or_default()
    }
}

impl RetryObserver for StatsObserver {
    fn observe(&self, event: &RetryEvent<'_>) {
        let counter = match event {
            RetryEvent::Started { .. } => &self.starts,
            RetryEvent::Scheduled { delay, .. } => {
                if let Ok(mut delays) = self.delays.lock() {
                    delays.push(*delay);
                }
                &self.retries
            }
            RetryEvent::Succeeded { .. } => &self.successes,
            RetryEvent::Exhausted { .. } => &self.exhaustions,
            RetryEvent::Rejected { .. } | RetryEvent::Cancelled { .. } => &self.stops,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_stats_observer_records_delays() {
        let observer = StatsObserver::new();
        let error = io::Error::other("reset");

        for (attempt, delay_ms) in [(1, 100), (2, 200)] {
            observer.observe(&RetryEvent::Started {
                attempt,
                max_attempts: 3,
            });
            observer.observe(&RetryEvent::Scheduled {
                attempt,
                error: &error,
                delay: Duration::from_millis(delay_ms),
            });
        }
        observer.observe(&RetryEvent::Started {
            attempt: 3,
            max_attempts: 3,
        });
        observer.observe(&RetryEvent::Exhausted {
            attempts: 3,
            error: &error,
        });

        assert_eq!(observer.attempt_starts(), 3);
        assert_eq!(observer.retries(), 2);
        assert_eq!(observer.exhaustions(), 1);
        assert_eq!(
            observer.delays(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn test_rejected_and_cancelled_both_count_as_stops() {
        let observer = Arc::new(StatsObserver::new());
        let error = io::Error::other("bad request");

        observer.observe(&RetryEvent::Rejected {
            attempt: 1,
            error: &error,
        });
        observer.observe(&RetryEvent::Cancelled {
            attempt: 2,
            error: &error,
        });

        assert_eq!(observer.stops(), 2);
        assert_eq!(observer.retries(), 0);
    }

    #[test]
    fn test_tracing_observer_accepts_every_event() {
        let observer = TracingObserver::new("webhook");
        let error = io::Error::other("timeout");
        assert_eq!(observer.operation(), "webhook");

        observer.observe(&RetryEvent::Succeeded {
            attempt: 2,
            elapsed: Duration::from_secs(1),
        });
        observer.observe(&RetryEvent::Rejected {
            attempt: 1,
            error: &error,
        });
    }
}
