//! Linear backoff between forwarding attempts.

use std::time::Duration;

/// Delay unit: the wait after attempt `n` (0-based) is `(n + 1)` steps.
pub const BACKOFF_STEP: Duration = Duration::from_millis(1000);

/// Delay to wait after the failed attempt `attempt` (0-based).
///
/// 1s, 2s, 3s, ... for the default step. No jitter, no cap.
pub fn linear_backoff(attempt: u32, step: Duration) -> Duration {
    step.saturating_mul(attempt.saturating_add(1))
}

/// Sum of every delay a policy with `retries` retries can spend sleeping.
pub fn total_backoff(retries: u32, step: Duration) -> Duration {
    (0..retries).fold(Duration::ZERO, |acc, attempt| {
        acc.saturating_add(linear_backoff(attempt, step))
    })
}
