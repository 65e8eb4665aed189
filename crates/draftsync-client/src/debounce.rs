// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Debounce timer, decoupled from any UI lifecycle.
//!
//! At most one timer is armed at a time: scheduling again cancels the previous
//! timer and starts a fresh one (reset, not extend), so a burst of edits
//! followed by one idle window produces exactly one fire.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Single-slot debounce timer.
///
/// Must be used from within a tokio runtime; the armed timer runs as a
/// spawned task that races a sleep against its cancellation token.
#[derive(Debug, Default)]
pub struct DebounceScheduler {
    armed: Mutex<Option<CancellationToken>>,
}

impl DebounceScheduler {
    /// Create a scheduler with no timer armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer: after `delay` of not being rescheduled or cancelled,
    /// run `task`. Any previously armed timer is cancelled first.
    pub fn schedule<F, Fut>(&self, delay: Duration, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let token = CancellationToken::new();
        let previous = self
            .armed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    trace!("Debounce timer cancelled");
                }

                _ = tokio::time::sleep(delay) => {
                    trace!(delay_ms = delay.as_millis() as u64, "Debounce timer fired");
                    task().await;
                }
            }
        });
    }

    /// Cancel the armed timer, if any.
    pub fn cancel(&self) {
        if let Some(token) = self
            .armed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            token.cancel();
        }
    }

}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let scheduler = DebounceScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        scheduler.schedule(Duration::from_millis(100), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_resets_not_extends() {
        let scheduler = DebounceScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = fired.clone();
            scheduler.schedule(Duration::from_millis(100), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        // 150ms elapsed, but no individual timer ran its full 100ms yet.
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let scheduler = DebounceScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        scheduler.schedule(Duration::from_millis(100), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_armed_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let scheduler = DebounceScheduler::new();
            let counter = fired.clone();
            scheduler.schedule(Duration::from_millis(100), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
