// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Store abstraction for submissions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{AutosaveOutcome, FieldMap, SubmissionRecord, VersionRecord};

/// Storage seam for submissions.
///
/// Implementations own versioning: every successful write bumps the
/// submission's version by exactly one and appends a [`VersionRecord`].
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Return the user's existing draft for the form, or create a fresh one.
    async fn start(&self, user_id: &str, form_id: &str) -> Result<SubmissionRecord>;

    /// Fetch a submission by ID.
    async fn get(&self, submission_id: Uuid) -> Result<SubmissionRecord>;

    /// Merge a partial change set under an optimistic version check.
    ///
    /// If `base_version` no longer matches the stored version, nothing is
    /// written and [`AutosaveOutcome::Conflict`] carries the authoritative
    /// state back to the caller.
    async fn autosave(
        &self,
        submission_id: Uuid,
        changes: FieldMap,
        base_version: i64,
    ) -> Result<AutosaveOutcome>;

    /// Replace the full data set.
    ///
    /// When `version` is provided the same optimistic check as
    /// [`autosave`](Self::autosave) applies; `None` skips the check.
    async fn save(
        &self,
        submission_id: Uuid,
        data: FieldMap,
        version: Option<i64>,
    ) -> Result<AutosaveOutcome>;

    /// Finalize a draft. Only valid from `Draft`.
    async fn submit(&self, submission_id: Uuid) -> Result<SubmissionRecord>;

    /// Withdraw a submitted application. Only valid from `Submitted` or
    /// `UnderReview`.
    async fn withdraw(&self, submission_id: Uuid) -> Result<SubmissionRecord>;

    /// Version history, newest first, capped at 50 entries.
    async fn versions(&self, submission_id: Uuid) -> Result<Vec<VersionRecord>>;

    /// Copy a historical version forward as a new version.
    async fn restore(&self, submission_id: Uuid, version: i64) -> Result<SubmissionRecord>;

    /// All submissions for a user, most recently updated first, optionally
    /// narrowed to one form.
    async fn list(&self, user_id: &str, form_id: Option<&str>) -> Result<Vec<SubmissionRecord>>;
}
