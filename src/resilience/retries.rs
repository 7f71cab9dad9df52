//! Retry policy and the attempt state machine.
//!
//! # States
//! ```text
//! Idle ──start──▶ Attempting(n) ──success──▶ Succeeded
//!                     │
//!                  failure
//!                     ├── attempts left ──▶ BackingOff(n, delay) ──resume──▶ Attempting(n+1)
//!                     └── none left ──────▶ Failed
//! ```
//!
//! The machine only decides; the caller performs the attempt and the sleep.
//! That keeps the backoff step interceptable in tests.

use std::time::Duration;

use crate::resilience::backoff::{linear_backoff, BACKOFF_STEP};

/// Bounded retry policy with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Backoff unit.
    pub step: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            step: BACKOFF_STEP,
        }
    }

    /// Total attempts the policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay before the attempt following `attempt`, or `None` when
    /// `attempt` was the last one.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.retries).then(|| linear_backoff(attempt, self.step))
    }
}

/// Where a retried call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Attempting { attempt: u32 },
    BackingOff { attempt: u32, delay: Duration },
    Succeeded { attempts: u32 },
    Failed { attempts: u32 },
}

/// Drives a [`RetryPolicy`] through [`RetryState`] transitions.
#[derive(Debug, Clone)]
pub struct RetryMachine {
    policy: RetryPolicy,
    state: RetryState,
}

impl RetryMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: RetryState::Idle,
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        match self.state {
            RetryState::Idle => 0,
            RetryState::Attempting { attempt } | RetryState::BackingOff { attempt, .. } => attempt + 1,
            RetryState::Succeeded { attempts } | RetryState::Failed { attempts } => attempts,
        }
    }

    /// Begin the first attempt. Returns its 0-based index.
    pub fn start(&mut self) -> u32 {
        self.state = RetryState::Attempting { attempt: 0 };
        0
    }

    /// Record that the current attempt produced a result.
    pub fn succeed(&mut self) {
        self.state = RetryState::Succeeded {
            attempts: self.attempts(),
        };
    }

    /// Record that the current attempt failed.
    ///
    /// Returns the delay to sleep before resuming, or `None` when the policy
    /// is exhausted and the machine is now `Failed`.
    pub fn fail(&mut self) -> Option<Duration> {
        match self.state {
            RetryState::Attempting { attempt } => match self.policy.delay_after(attempt) {
                Some(delay) => {
                    self.state = RetryState::BackingOff { attempt, delay };
                    Some(delay)
                }
                None => {
                    self.state = RetryState::Failed {
                        attempts: attempt + 1,
                    };
                    None
                }
            },
            _ => {
                self.state = RetryState::Failed {
                    attempts: self.attempts(),
                };
                None
            }
        }
    }

    /// Leave `BackingOff` and start the next attempt. Returns its index.
    pub fn resume(&mut self) -> u32 {
        let next = match self.state {
            RetryState::BackingOff { attempt, .. } => attempt + 1,
            RetryState::Attempting { attempt } => attempt,
            _ => 0,
        };
        self.state = RetryState::Attempting { attempt: next };
        next
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RetryState::Succeeded { .. } | RetryState::Failed { .. })
    }
}
