//! Retry execution engine with policy-based configuration
//!
//! Wraps a fallible async operation and re-invokes it under a bounded
//! exponential-backoff [`RetryPolicy`](crate::types::RetryPolicy).
//!
//! # Features
//!
//! - Strictly multiplicative backoff (`d, d*b, d*b^2, ...`)
//! - Kind-based retry classification (network failures by default)
//! - Every attempt reported as a `RetryEvent` to a `RetryObserver`
//! - A retry callback invoked before every backoff wait
//! - Cancellable backoff waits
//!
//! # Example
//!
//! ```rust,no_run
//! use courier_core::retry::{retry_with_policy, RetryError};
//! use courier_core::types::RetryPolicy;
//! use courier_core::Error;
//!
//! async fn example() -> Result<String, RetryError<Error>> {
//!     let policy = RetryPolicy::default();
//!
//!     retry_with_policy(&policy, || async {
//!         Ok("sent".to_string())
//!     }).await
//! }
//! ```

mod error;
mod executor;
mod observer;
mod strategies;

pub use error::RetryError;
pub use executor::{
    retry_with_policy, AttemptOutcome, RetryCallback, RetryExecutor, RetryExecutorBuilder,
};
pub use observer::{RetryEvent, RetryObserver, StatsObserver, TracingObserver};
pub use strategies::{
    calculate_delay, AlwaysRetry, ClassifiedError, ClosurePredicate, KindPredicate, NeverRetry,
    RetryPredicate,
};
