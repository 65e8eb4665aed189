// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Debounced whole-document saving without field-level diffing.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use draftsync_store::{AutosaveOutcome, FieldMap};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::AutosaveBackend;
use crate::debounce::DebounceScheduler;
use crate::error::Result;

/// Default debounce for the whole-document saver. Short enough to feel
/// immediate, long enough to coalesce a typing burst.
pub const SIMPLE_SAVE_DELAY: Duration = Duration::from_millis(300);

/// Debounced whole-document saver without field-level diffing.
///
/// The lightweight alternative to [`DraftSession`](crate::DraftSession) for
/// single-editor surfaces: every [`update`](Self::update) replaces the queued
/// document and re-arms a short timer; on fire the full document is written.
/// The only change detection is a structural comparison against the last
/// successfully saved document, so an unchanged document never hits the wire.
/// On a version conflict the saver adopts the server version and re-queues the
/// document, so the local copy wins on the next fire. Use a session when
/// concurrent editors should not overwrite each other.
pub struct SimpleSaver {
    inner: Arc<SimpleInner>,
}

struct SimpleState {
    queued: Option<FieldMap>,
    last_saved: Option<FieldMap>,
    version: Option<i64>,
}

struct SimpleInner {
    backend: Arc<dyn AutosaveBackend>,
    submission_id: Uuid,
    delay: Duration,
    scheduler: DebounceScheduler,
    state: Mutex<SimpleState>,
    in_flight: AtomicBool,
}

impl SimpleSaver {
    pub fn new(backend: Arc<dyn AutosaveBackend>, submission_id: Uuid) -> Self {
        Self::with_delay(backend, submission_id, SIMPLE_SAVE_DELAY)
    }

    pub fn with_delay(
        backend: Arc<dyn AutosaveBackend>,
        submission_id: Uuid,
        delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SimpleInner {
                backend,
                submission_id,
                delay,
                scheduler: DebounceScheduler::new(),
                state: Mutex::new(SimpleState {
                    queued: None,
                    last_saved: None,
                    version: None,
                }),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Seed the last-saved document and version, so the first fire carries a
    /// version check and an unchanged document is skipped from the start.
    pub fn with_baseline(self, data: FieldMap, version: i64) -> Self {
        {
            let mut state = self.inner.state();
            state.last_saved = Some(data);
            state.version = Some(version);
        }
        self
    }

    /// Queue the full document for saving and (re)arm the timer.
    ///
    /// A document structurally equal to the last saved one is dropped instead
    /// of queued.
    pub fn update(&self, data: FieldMap) {
        {
            let mut state = self.inner.state();
            if state.last_saved.as_ref() == Some(&data) {
                state.queued = None;
                return;
            }
            state.queued = Some(data);
        }
        let task_inner = Arc::clone(&self.inner);
        self.inner
            .scheduler
            .schedule(self.inner.delay, move || SimpleInner::fire(task_inner));
    }

    /// Save the queued document now, if any.
    pub async fn flush(&self) -> Result<()> {
        self.inner.scheduler.cancel();
        self.inner.save_queued().await
    }

    /// Drop the queued document without saving it.
    pub fn cancel(&self) {
        self.inner.scheduler.cancel();
        self.inner.state().queued = None;
    }

    /// True while a document is queued and not yet written.
    pub fn is_dirty(&self) -> bool {
        self.inner.state().queued.is_some()
    }

    /// Last version confirmed by the backend, if any save has completed.
    pub fn version(&self) -> Option<i64> {
        self.inner.state().version
    }
}

impl SimpleInner {
    fn state(&self) -> MutexGuard<'_, SimpleState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn fire(inner: Arc<SimpleInner>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        // A conflict or failure leaves the document queued; try again after
        // another window rather than waiting for the next edit. The returned
        // future is boxed so `fire`'s own future type does not recurse into
        // itself through the scheduler's `Send` bound.
        Box::pin(async move {
            if let Err(err) = inner.save_queued().await {
                warn!(error = %err, "Whole-document save failed; document re-queued");
            }
            if inner.state().queued.is_some() {
                let again = Arc::clone(&inner);
                inner
                    .scheduler
                    .schedule(inner.delay, move || SimpleInner::fire(again));
            }
        })
    }

    /// Take the queued document and write it with the last-known version.
    ///
    /// On failure the document is put back so a later update or flush retries
    /// it, unless a newer document was queued in the meantime. On conflict the
    /// server version is adopted and the document re-queued, so the local copy
    /// wins the next round.
    async fn save_queued(&self) -> Result<()> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let (data, version) = {
            let mut state = self.state();
            match state.queued.take() {
                Some(data) => (data, state.version),
                None => {
                    self.in_flight.store(false, Ordering::SeqCst);
                    return Ok(());
                }
            }
        };

        let result = self
            .backend
            .save(self.submission_id, data.clone(), version)
            .await;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(AutosaveOutcome::Saved { version, .. }) => {
                debug!(submission_id = %self.submission_id, version, "Whole-document save confirmed");
                let mut state = self.state();
                state.last_saved = Some(data);
                state.version = Some(version);
                Ok(())
            }
            Ok(AutosaveOutcome::Conflict { server_version, .. }) => {
                warn!(
                    submission_id = %self.submission_id,
                    server_version, "Whole-document save conflicted; re-queued at server version"
                );
                let mut state = self.state();
                state.version = Some(server_version);
                if state.queued.is_none() {
                    state.queued = Some(data);
                }
                Ok(())
            }
            Err(err) => {
                let mut state = self.state();
                if state.queued.is_none() {
                    state.queued = Some(data);
                }
                Err(err)
            }
        }
    }
}
