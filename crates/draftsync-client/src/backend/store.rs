// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Embedded backend over a [`SubmissionStore`].
//!
//! Bypasses HTTP and calls the store directly. Used by tests and by
//! deployments that run the store in the same process.

use std::sync::Arc;

use async_trait::async_trait;
use draftsync_store::{AutosaveOutcome, FieldMap, SubmissionRecord, SubmissionStore, VersionRecord};
use tracing::debug;
use uuid::Uuid;

use super::AutosaveBackend;
use crate::error::Result;

/// Backend wrapping an [`Arc<dyn SubmissionStore>`].
#[derive(Clone)]
pub struct StoreBackend {
    store: Arc<dyn SubmissionStore>,
}

impl StoreBackend {
    /// Create a backend over the given store.
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AutosaveBackend for StoreBackend {
    async fn autosave(
        &self,
        submission_id: Uuid,
        changes: FieldMap,
        base_version: i64,
    ) -> Result<AutosaveOutcome> {
        debug!(%submission_id, base_version, "Autosave via embedded store");
        Ok(self.store.autosave(submission_id, changes, base_version).await?)
    }

    async fn save(
        &self,
        submission_id: Uuid,
        data: FieldMap,
        version: Option<i64>,
    ) -> Result<AutosaveOutcome> {
        Ok(self.store.save(submission_id, data, version).await?)
    }

    async fn submit(&self, submission_id: Uuid) -> Result<SubmissionRecord> {
        Ok(self.store.submit(submission_id).await?)
    }

    async fn versions(&self, submission_id: Uuid) -> Result<Vec<VersionRecord>> {
        Ok(self.store.versions(submission_id).await?)
    }

    async fn restore(&self, submission_id: Uuid, version: i64) -> Result<SubmissionRecord> {
        Ok(self.store.restore(submission_id, version).await?)
    }
}
