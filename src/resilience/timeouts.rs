//! Per-attempt timeout enforcement.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities around the whole attempt, body included
//! - A configured timeout of 0 means the attempt is not bounded

use std::future::Future;
use std::time::Duration;

use tokio::time::error::Elapsed;

/// Deadline for one attempt, `None` when unbounded.
pub fn attempt_timeout(timeout_ms: u64) -> Option<Duration> {
    (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms))
}

/// Run `fut`, giving up after `limit` when one is set.
pub async fn bounded<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, Elapsed> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await,
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_unbounded() {
        assert_eq!(attempt_timeout(0), None);
        assert_eq!(attempt_timeout(250), Some(Duration::from_millis(250)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_elapses() {
        let result = bounded(
            Some(Duration::from_millis(100)),
            tokio::time::sleep(Duration::from_secs(10)),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unbounded_completes() {
        assert_eq!(bounded(None, async { 7 }).await.unwrap(), 7);
    }
}
