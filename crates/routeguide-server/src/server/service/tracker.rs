//! In-flight call tracking and graceful shutdown.
//!
//! Every call holds a [`CallGuard`] for its whole lifetime, including the
//! background task that feeds a response stream. Shutdown happens in phases:
//!
//! 1. Refuse new calls with [`Error::ServiceShutdown`].
//! 2. Wait up to the configured timeout for in-flight calls to finish.
//! 3. Cancel whatever is still running; streaming tasks observe the
//!    cancellation through [`CallGuard::cancelled`] and stop promptly.

use crate::server::telemetry::{decrement_streams_inflight, increment_streams_inflight};
use core::time::Duration;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use routeguide_core::Error;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

pub struct CallTracker {
    accepting: AtomicBool,
    inflight: AtomicUsize,
    shutdown_token: CancellationToken,
    shutdown_timeout: Duration,
}

impl CallTracker {
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            accepting: AtomicBool::new(true),
            inflight: AtomicUsize::new(0),
            shutdown_token: CancellationToken::new(),
            shutdown_timeout,
        }
    }

    /// Registers a new call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once shutdown has begun.
    pub fn begin(self: &Arc<Self>) -> Result<CallGuard, Error> {
        // Count first, then check: a call that slips in here is either seen by
        // the drain loop or refused.
        self.inflight.fetch_add(1, Ordering::SeqCst);
        if self.is_shutting_down() {
            self.inflight.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::ServiceShutdown);
        }
        increment_streams_inflight();
        Ok(CallGuard {
            tracker: Arc::clone(self),
        })
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    pub fn is_shutting_down(&self) -> bool {
        !self.accepting.load(Ordering::SeqCst)
    }

    /// Stops accepting calls, drains, then cancels the stragglers.
    pub async fn shutdown(&self) {
        // === Phase 0: Stop accepting new calls ===
        tracing::info!("Refusing new calls");
        self.accepting.store(false, Ordering::SeqCst);

        // === Phase 1: Wait for in-flight calls to drain ===
        tracing::info!("Draining in-flight calls ({} active)", self.inflight());
        let drained = timeout(self.shutdown_timeout, async {
            while self.inflight() > 0 {
                sleep(Duration::from_millis(50)).await;
            }
        })
        .await;

        match drained {
            Ok(()) => tracing::debug!("All in-flight calls drained"),
            Err(_) => tracing::warn!(
                "Graceful drain timed out ({} calls still active)",
                self.inflight()
            ),
        }

        // === Phase 2: Cancel remaining work ===
        tracing::debug!("Cancelling remaining calls via shutdown token");
        self.shutdown_token.cancel();
    }
}

/// Registration of one in-flight call. Dropping it marks the call finished.
pub struct CallGuard {
    tracker: Arc<CallTracker>,
}

impl CallGuard {
    /// Resolves once shutdown cancels outstanding calls.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.tracker.shutdown_token.cancelled()
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.tracker.inflight.fetch_sub(1, Ordering::SeqCst);
        decrement_streams_inflight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guards_count_inflight_calls() {
        let tracker = Arc::new(CallTracker::new(Duration::from_secs(1)));
        let a = tracker.begin().unwrap();
        let b = tracker.begin().unwrap();
        assert_eq!(tracker.inflight(), 2);
        drop(a);
        assert_eq!(tracker.inflight(), 1);
        drop(b);
        assert_eq!(tracker.inflight(), 0);
    }

    #[tokio::test]
    async fn shutdown_refuses_new_calls() {
        let tracker = Arc::new(CallTracker::new(Duration::from_millis(10)));
        tracker.shutdown().await;
        assert!(tracker.is_shutting_down());
        assert!(matches!(tracker.begin(), Err(Error::ServiceShutdown)));
        assert_eq!(tracker.inflight(), 0);
    }

    #[tokio::test]
    async fn shutdown_waits_for_drain_before_cancelling() {
        let tracker = Arc::new(CallTracker::new(Duration::from_secs(5)));
        let guard = tracker.begin().unwrap();

        let finisher = tokio::spawn(async move {
            sleep(Duration::from_millis(100)).await;
            drop(guard);
        });

        tracker.shutdown().await;
        finisher.await.unwrap();
        assert_eq!(tracker.inflight(), 0);
    }

    #[tokio::test]
    async fn stragglers_are_cancelled_after_timeout() {
        let tracker = Arc::new(CallTracker::new(Duration::from_millis(50)));
        let guard = tracker.begin().unwrap();

        let shutdown = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.shutdown().await })
        };

        timeout(Duration::from_secs(2), guard.cancelled())
            .await
            .expect("straggler was never cancelled");
        shutdown.await.unwrap();
        drop(guard);
        assert_eq!(tracker.inflight(), 0);
    }
}
