// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory submission store.
//!
//! Suitable for tests and single-process embedding. All submissions and their
//! version history live behind one `RwLock`; writes take the lock for the
//! whole check-merge-bump sequence, so the optimistic version check and the
//! version increment are atomic with respect to each other.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::SubmissionStore;
use crate::types::{
    AutosaveOutcome, ChangeType, FieldMap, SubmissionRecord, SubmissionStatus, VersionRecord,
};

/// Maximum number of history entries returned by `versions`.
const VERSION_HISTORY_LIMIT: usize = 50;

#[derive(Default)]
struct Inner {
    submissions: HashMap<Uuid, SubmissionRecord>,
    history: HashMap<Uuid, Vec<VersionRecord>>,
}

/// In-memory [`SubmissionStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_version(
        inner: &mut Inner,
        submission_id: Uuid,
        version: i64,
        data: FieldMap,
        changed_fields: Option<Vec<String>>,
        change_type: ChangeType,
    ) {
        inner
            .history
            .entry(submission_id)
            .or_default()
            .push(VersionRecord {
                id: Uuid::new_v4(),
                submission_id,
                version,
                data,
                changed_fields,
                change_type,
                created_at: Utc::now(),
            });
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    #[instrument(skip(self))]
    async fn start(&self, user_id: &str, form_id: &str) -> Result<SubmissionRecord> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner
            .submissions
            .values()
            .find(|s| s.user_id == user_id && s.form_id == form_id)
        {
            debug!(submission_id = %existing.id, "Returning existing draft");
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            form_id: form_id.to_string(),
            status: SubmissionStatus::Draft,
            data: FieldMap::new(),
            version: 1,
            submitted_at: None,
            last_autosave_at: None,
            created_at: now,
            updated_at: now,
        };
        debug!(submission_id = %record.id, "Created new draft");
        inner.submissions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, submission_id: Uuid) -> Result<SubmissionRecord> {
        let inner = self.inner.read().await;
        inner
            .submissions
            .get(&submission_id)
            .cloned()
            .ok_or(StoreError::NotFound { submission_id })
    }

    #[instrument(skip(self, changes), fields(change_count = changes.len()))]
    async fn autosave(
        &self,
        submission_id: Uuid,
        changes: FieldMap,
        base_version: i64,
    ) -> Result<AutosaveOutcome> {
        let mut inner = self.inner.write().await;
        let submission = inner
            .submissions
            .get_mut(&submission_id)
            .ok_or(StoreError::NotFound { submission_id })?;

        if submission.version != base_version {
            warn!(
                client_version = base_version,
                server_version = submission.version,
                "Autosave conflict"
            );
            return Ok(AutosaveOutcome::Conflict {
                server_version: submission.version,
                server_data: submission.data.clone(),
            });
        }

        let changed_fields: Vec<String> = changes.keys().cloned().collect();
        for (field_id, value) in changes {
            submission.data.insert(field_id, value);
        }

        let now = Utc::now();
        submission.version += 1;
        submission.last_autosave_at = Some(now);
        submission.updated_at = now;

        let version = submission.version;
        let data = submission.data.clone();
        debug!(version, "Autosave merged");
        Self::record_version(
            &mut inner,
            submission_id,
            version,
            data,
            Some(changed_fields),
            ChangeType::Autosave,
        );

        Ok(AutosaveOutcome::Saved {
            version,
            saved_at: now,
        })
    }

    #[instrument(skip(self, data), fields(field_count = data.len()))]
    async fn save(
        &self,
        submission_id: Uuid,
        data: FieldMap,
        version: Option<i64>,
    ) -> Result<AutosaveOutcome> {
        let mut inner = self.inner.write().await;
        let submission = inner
            .submissions
            .get_mut(&submission_id)
            .ok_or(StoreError::NotFound { submission_id })?;

        if let Some(base_version) = version {
            if submission.version != base_version {
                warn!(
                    client_version = base_version,
                    server_version = submission.version,
                    "Full save conflict"
                );
                return Ok(AutosaveOutcome::Conflict {
                    server_version: submission.version,
                    server_data: submission.data.clone(),
                });
            }
        }

        let now = Utc::now();
        submission.data = data;
        submission.version += 1;
        submission.last_autosave_at = Some(now);
        submission.updated_at = now;

        let new_version = submission.version;
        let snapshot = submission.data.clone();
        Self::record_version(
            &mut inner,
            submission_id,
            new_version,
            snapshot,
            None,
            ChangeType::ManualSave,
        );

        Ok(AutosaveOutcome::Saved {
            version: new_version,
            saved_at: now,
        })
    }

    #[instrument(skip(self))]
    async fn submit(&self, submission_id: Uuid) -> Result<SubmissionRecord> {
        let mut inner = self.inner.write().await;
        let submission = inner
            .submissions
            .get_mut(&submission_id)
            .ok_or(StoreError::NotFound { submission_id })?;

        if submission.status != SubmissionStatus::Draft {
            return Err(StoreError::InvalidState {
                submission_id,
                expected: SubmissionStatus::Draft.as_str().to_string(),
                actual: submission.status.as_str().to_string(),
            });
        }

        let now = Utc::now();
        submission.status = SubmissionStatus::Submitted;
        submission.submitted_at = Some(now);
        submission.version += 1;
        submission.updated_at = now;

        let record = submission.clone();
        Self::record_version(
            &mut inner,
            submission_id,
            record.version,
            record.data.clone(),
            None,
            ChangeType::Submit,
        );
        debug!(version = record.version, "Submission finalized");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn withdraw(&self, submission_id: Uuid) -> Result<SubmissionRecord> {
        let mut inner = self.inner.write().await;
        let submission = inner
            .submissions
            .get_mut(&submission_id)
            .ok_or(StoreError::NotFound { submission_id })?;

        match submission.status {
            SubmissionStatus::Submitted | SubmissionStatus::UnderReview => {}
            other => {
                return Err(StoreError::InvalidState {
                    submission_id,
                    expected: SubmissionStatus::Submitted.as_str().to_string(),
                    actual: other.as_str().to_string(),
                });
            }
        }

        submission.status = SubmissionStatus::Withdrawn;
        submission.updated_at = Utc::now();
        Ok(submission.clone())
    }

    async fn versions(&self, submission_id: Uuid) -> Result<Vec<VersionRecord>> {
        let inner = self.inner.read().await;
        if !inner.submissions.contains_key(&submission_id) {
            return Err(StoreError::NotFound { submission_id });
        }

        let mut versions = inner.history.get(&submission_id).cloned().unwrap_or_default();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        versions.truncate(VERSION_HISTORY_LIMIT);
        Ok(versions)
    }

    #[instrument(skip(self))]
    async fn restore(&self, submission_id: Uuid, version: i64) -> Result<SubmissionRecord> {
        let mut inner = self.inner.write().await;
        if !inner.submissions.contains_key(&submission_id) {
            return Err(StoreError::NotFound { submission_id });
        }

        let restored_data = inner
            .history
            .get(&submission_id)
            .and_then(|versions| versions.iter().find(|v| v.version == version))
            .map(|v| v.data.clone())
            .ok_or(StoreError::VersionNotFound {
                submission_id,
                version,
            })?;

        let submission = inner
            .submissions
            .get_mut(&submission_id)
            .ok_or(StoreError::NotFound { submission_id })?;

        let now = Utc::now();
        submission.data = restored_data.clone();
        submission.version += 1;
        submission.last_autosave_at = Some(now);
        submission.updated_at = now;

        let record = submission.clone();
        Self::record_version(
            &mut inner,
            submission_id,
            record.version,
            restored_data,
            None,
            ChangeType::Restore,
        );
        debug!(
            restored_from = version,
            new_version = record.version,
            "Version restored"
        );
        Ok(record)
    }

    async fn list(&self, user_id: &str, form_id: Option<&str>) -> Result<Vec<SubmissionRecord>> {
        let inner = self.inner.read().await;
        let mut submissions: Vec<SubmissionRecord> = inner
            .submissions
            .values()
            .filter(|s| s.user_id == user_id)
            .filter(|s| form_id.is_none_or(|f| s.form_id == f))
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(submissions)
    }
}
