//! # courier-notify
//!
//! Outbound notification delivery for Courier. Delivery failures are
//! reported as `courier_core::Error` values so callers can retry transport
//! problems and fail fast on everything else.

pub mod webhook;

pub use webhook::{WebhookNotifier, DEFAULT_TIMEOUT};
