// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backend implementations for draft persistence.
//!
//! This module provides different backends for save operations:
//! - `http`: REST calls against a submissions API (default)
//! - `store`: direct calls into a [`SubmissionStore`](draftsync_store::SubmissionStore)
//!   for tests and single-process embedding

#[cfg(feature = "http")]
pub mod http;

pub mod store;

use async_trait::async_trait;
use draftsync_store::{AutosaveOutcome, FieldMap, SubmissionRecord, VersionRecord};
use uuid::Uuid;

use crate::error::Result;

/// Backend seam for draft persistence.
///
/// The trait abstracts the transport, allowing the session to work against
/// either a remote submissions API or an embedded store.
#[async_trait]
pub trait AutosaveBackend: Send + Sync {
    /// Send a partial change set with the client's base version.
    ///
    /// A version conflict is a successful call returning
    /// [`AutosaveOutcome::Conflict`], not an error.
    async fn autosave(
        &self,
        submission_id: Uuid,
        changes: FieldMap,
        base_version: i64,
    ) -> Result<AutosaveOutcome>;

    /// Replace the full data set (the simplified, non-diffing save path).
    async fn save(
        &self,
        submission_id: Uuid,
        data: FieldMap,
        version: Option<i64>,
    ) -> Result<AutosaveOutcome>;

    /// Finalize the submission.
    async fn submit(&self, submission_id: Uuid) -> Result<SubmissionRecord>;

    /// Fetch version history, newest first.
    async fn versions(&self, submission_id: Uuid) -> Result<Vec<VersionRecord>>;

    /// Restore a historical version as a new version.
    async fn restore(&self, submission_id: Uuid, version: i64) -> Result<SubmissionRecord>;
}
