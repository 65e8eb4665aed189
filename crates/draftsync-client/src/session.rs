// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Draft session: debounced, single-flight autosave with conflict adoption.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use draftsync_store::{AutosaveOutcome, FieldMap, SubmissionRecord, VersionRecord};
use serde_json::Value;
use tokio::sync::Notify;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::backend::AutosaveBackend;
use crate::config::SessionConfig;
use crate::debounce::DebounceScheduler;
use crate::error::{ClientError, Result};
use crate::guard::UnloadGuard;
use crate::hooks::SessionHooks;
use crate::tracker::ChangeTracker;
use crate::types::{DraftSnapshot, SaveState};

struct SessionState {
    tracker: ChangeTracker,
    version: i64,
    last_saved_at: Option<DateTime<Utc>>,
}

pub(crate) struct SessionInner {
    backend: Arc<dyn AutosaveBackend>,
    submission_id: Uuid,
    config: SessionConfig,
    hooks: SessionHooks,
    state: Mutex<SessionState>,
    /// Single-flight latch: only one autosave round-trip per draft at a time.
    in_flight: AtomicBool,
    /// Signalled whenever the in-flight latch clears, so explicit flushes can
    /// wait for the current round-trip instead of being suppressed.
    idle: Notify,
    scheduler: DebounceScheduler,
}

/// Editing session for one draft.
///
/// The session owns the pending change set and the debounce timer; the host
/// UI owns rendering and delegates every persistence decision here. Handles
/// are cheap to clone and share one underlying state.
///
/// # Example
///
/// ```ignore
/// use draftsync_client::{DraftSession, SessionConfig, SessionHooks};
///
/// let session = DraftSession::with_options(
///     backend,
///     submission_id,
///     initial_data,
///     initial_version,
///     SessionConfig::default(),
///     SessionHooks::new().on_conflict(|server_data, server_version| {
///         // surface a toast / diff view
///     }),
/// );
///
/// // Every edit re-arms the debounce timer; one idle window later a single
/// // autosave carries the whole burst.
/// session.record_field_change("name", "Alice".into());
///
/// // Flush explicitly before navigation.
/// session.force_save().await?;
/// ```
#[derive(Clone)]
pub struct DraftSession {
    inner: Arc<SessionInner>,
}

impl DraftSession {
    /// Create a session with default configuration and no hooks.
    pub fn new(
        backend: Arc<dyn AutosaveBackend>,
        submission_id: Uuid,
        initial_data: FieldMap,
        initial_version: i64,
    ) -> Self {
        Self::with_options(
            backend,
            submission_id,
            initial_data,
            initial_version,
            SessionConfig::default(),
            SessionHooks::default(),
        )
    }

    /// Create a session with explicit configuration and hooks.
    pub fn with_options(
        backend: Arc<dyn AutosaveBackend>,
        submission_id: Uuid,
        initial_data: FieldMap,
        initial_version: i64,
        config: SessionConfig,
        hooks: SessionHooks,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend,
                submission_id,
                config,
                hooks,
                state: Mutex::new(SessionState {
                    tracker: ChangeTracker::new(initial_data),
                    version: initial_version,
                    last_saved_at: None,
                }),
                in_flight: AtomicBool::new(false),
                idle: Notify::new(),
                scheduler: DebounceScheduler::new(),
            }),
        }
    }

    // ========== Edits ==========

    /// Record one field edit and (re)arm the debounce timer.
    pub fn record_field_change(&self, field_id: &str, value: Value) {
        self.inner.state().tracker.record_change(field_id, value);
        if self.inner.config.enabled {
            SessionInner::arm(&self.inner, self.inner.config.debounce);
        }
    }

    /// Record several field edits at once (e.g. pasted structured data) and
    /// (re)arm the debounce timer.
    pub fn record_batch_change(&self, changes: FieldMap) {
        self.inner.state().tracker.record_batch(changes);
        if self.inner.config.enabled {
            SessionInner::arm(&self.inner, self.inner.config.debounce);
        }
    }

    // ========== Saving ==========

    /// Save now: cancel the armed timer, wait out any in-flight round-trip,
    /// then run one autosave cycle.
    ///
    /// A no-op when there is nothing pending. Unlike a timer fire, an explicit
    /// save is never suppressed by the single-flight latch; it drains the
    /// current round-trip first so edits recorded during it are sent too.
    /// Errors are reported through `on_save_error` and also returned here;
    /// pending changes stay queued either way.
    pub async fn force_save(&self) -> Result<()> {
        self.inner.scheduler.cancel();
        match SessionInner::drain_and_save(&self.inner).await {
            Ok(()) => Ok(()),
            Err(err) => {
                SessionInner::arm(&self.inner, self.inner.config.retry_backoff);
                Err(err)
            }
        }
    }

    /// Tear the session down: cancel the timer and make a best-effort final
    /// flush of outstanding and in-flight changes.
    pub async fn close(&self) -> Result<()> {
        self.inner.scheduler.cancel();
        if self.has_pending_changes() || self.is_saving() {
            SessionInner::drain_and_save(&self.inner).await?;
        }
        Ok(())
    }

    /// Adopt externally resolved server state, discarding pending changes.
    pub fn reset_to_server(&self, data: FieldMap, version: i64) {
        let mut state = self.inner.state();
        state.tracker.reset_to(data);
        state.version = version;
    }

    // ========== Lifecycle ==========

    /// Flush outstanding changes, then finalize the submission.
    pub async fn submit(&self) -> Result<SubmissionRecord> {
        self.force_save().await?;
        let record = self.inner.backend.submit(self.inner.submission_id).await?;
        self.inner.state().version = record.version;
        debug!(version = record.version, "Submission finalized");
        Ok(record)
    }

    /// Fetch the draft's version history, newest first.
    pub async fn versions(&self) -> Result<Vec<VersionRecord>> {
        self.inner.backend.versions(self.inner.submission_id).await
    }

    /// Restore a historical version and adopt the result locally.
    ///
    /// Pending local edits are discarded in favor of the restored snapshot.
    pub async fn restore_version(&self, version: i64) -> Result<SubmissionRecord> {
        self.inner.scheduler.cancel();
        let record = self
            .inner
            .backend
            .restore(self.inner.submission_id, version)
            .await?;
        self.reset_to_server(record.data.clone(), record.version);
        Ok(record)
    }

    // ========== Observation ==========

    /// Guard for warning the user before discarding unsaved changes.
    pub fn unload_guard(&self) -> UnloadGuard {
        UnloadGuard::new(self.clone())
    }

    /// The draft being edited.
    pub fn submission_id(&self) -> Uuid {
        self.inner.submission_id
    }

    /// Visible form data: last-saved baseline overlaid with local edits.
    pub fn form_data(&self) -> FieldMap {
        self.inner.state().tracker.form_data().clone()
    }

    /// One field's current visible value.
    pub fn field(&self, field_id: &str) -> Option<Value> {
        self.inner.state().tracker.form_data().get(field_id).cloned()
    }

    /// Last-seen server version.
    pub fn version(&self) -> i64 {
        self.inner.state().version
    }

    /// When the last successful save was confirmed.
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state().last_saved_at
    }

    /// True while an autosave round-trip is in flight.
    pub fn is_saving(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// True if any field differs from the last-saved baseline.
    pub fn has_pending_changes(&self) -> bool {
        self.inner.state().tracker.has_pending()
    }

    /// Current position in the save cycle.
    pub fn save_state(&self) -> SaveState {
        if self.is_saving() {
            SaveState::Saving
        } else if self.has_pending_changes() {
            SaveState::Dirty
        } else {
            SaveState::Clean
        }
    }

    /// Consistent snapshot of the session's observable state.
    pub fn snapshot(&self) -> DraftSnapshot {
        let saving = self.is_saving();
        let state = self.inner.state();
        let save_state = if saving {
            SaveState::Saving
        } else if state.tracker.has_pending() {
            SaveState::Dirty
        } else {
            SaveState::Clean
        };
        DraftSnapshot {
            form_data: state.tracker.form_data().clone(),
            version: state.version,
            last_saved_at: state.last_saved_at,
            state: save_state,
        }
    }
}

impl SessionInner {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arm the debounce timer to run an autosave cycle after `delay`.
    fn arm(inner: &Arc<SessionInner>, delay: Duration) {
        let task_inner = Arc::clone(inner);
        inner
            .scheduler
            .schedule(delay, move || SessionInner::run_cycle(task_inner));
    }

    /// Timer-fire path: one cycle, with a follow-up timer armed whenever
    /// changes remain afterwards. Failures re-arm on the retry backoff so
    /// unsent changes are not stranded until the next edit; a cycle that was
    /// suppressed or left mid-flight edits behind re-arms on the debounce
    /// window.
    async fn run_cycle(inner: Arc<SessionInner>) {
        match SessionInner::autosave_once(&inner).await {
            Err(_) => SessionInner::arm(&inner, inner.config.retry_backoff),
            Ok(_) => {
                if inner.state().tracker.has_pending() {
                    SessionInner::arm(&inner, inner.config.debounce);
                }
            }
        }
    }

    /// Wait for any in-flight round-trip to clear, then run a cycle. Loops in
    /// case another fire wins the latch in between.
    async fn drain_and_save(inner: &Arc<SessionInner>) -> Result<()> {
        loop {
            let idle = inner.idle.notified();
            if inner.in_flight.load(Ordering::SeqCst) {
                idle.await;
            }
            if Self::autosave_once(inner).await? {
                return Ok(());
            }
        }
    }

    /// One autosave cycle: snapshot the delta, round-trip, reconcile.
    ///
    /// Returns `Ok(false)` when the fire lost the single-flight race and was
    /// suppressed. The pending set is cleared only after the round-trip
    /// resolves: a successful save absorbs the sent entries, a conflict voids
    /// them in favor of server state, a failure leaves them untouched for
    /// retry.
    #[instrument(skip(inner), fields(submission_id = %inner.submission_id))]
    async fn autosave_once(inner: &Arc<SessionInner>) -> Result<bool> {
        if !inner.config.enabled {
            return Ok(true);
        }

        let (changes, base_version) = {
            let state = inner.state();
            if !state.tracker.has_pending() {
                return Ok(true);
            }
            (state.tracker.pending_snapshot(), state.version)
        };

        if inner
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Save already in flight; fire suppressed");
            return Ok(false);
        }

        let result = match tokio::time::timeout(
            inner.config.request_timeout,
            inner
                .backend
                .autosave(inner.submission_id, changes.clone(), base_version),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout {
                elapsed_ms: inner.config.request_timeout.as_millis() as u64,
            }),
        };
        inner.in_flight.store(false, Ordering::SeqCst);
        inner.idle.notify_waiters();

        match result {
            Ok(AutosaveOutcome::Saved { version, saved_at }) => {
                {
                    let mut state = inner.state();
                    state.tracker.absorb_saved(&changes);
                    state.version = version;
                    state.last_saved_at = Some(saved_at);
                }
                debug!(version, "Autosave confirmed");
                inner.hooks.notify_save_success(version);
                Ok(true)
            }
            Ok(AutosaveOutcome::Conflict {
                server_version,
                server_data,
            }) => {
                warn!(
                    client_version = base_version,
                    server_version, "Autosave conflict; adopting server state"
                );
                // Observers see the server state before local edits are voided.
                inner.hooks.notify_conflict(&server_data, server_version);
                let mut state = inner.state();
                state.tracker.reset_to(server_data);
                state.version = server_version;
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "Autosave failed; pending changes retained");
                inner.hooks.notify_save_error(&err);
                Err(err)
            }
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            if state.tracker.has_pending() {
                warn!(
                    submission_id = %self.submission_id,
                    pending = state.tracker.pending().len(),
                    "Draft session dropped with unsaved changes"
                );
            }
        }
    }
}
