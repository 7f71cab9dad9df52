//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarded call:
//!     → timeouts.rs (bound each attempt by the service's timeoutMs)
//!     → On network failure/timeout: retries.rs decides retry or give up
//!     → backoff.rs computes the linear delay (1s, 2s, 3s, ...)
//!     → sleep.rs waits it out (Tokio timer, or recorded in tests)
//! ```
//!
//! # Design Decisions
//! - Timeouts are per attempt; there is no budget spanning retries
//! - Only network failures and timeouts are retried; any received response
//!   ends the loop
//! - Linear, not exponential, so worst-case latency stays predictable

pub mod backoff;
pub mod retries;
pub mod sleep;
pub mod timeouts;

pub use retries::{RetryMachine, RetryPolicy, RetryState};
pub use sleep::{RecordingSleeper, Sleeper, TokioSleeper};
