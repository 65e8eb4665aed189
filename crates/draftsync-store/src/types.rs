// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Record types for the submission store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Field identifier to value mapping used for submission data and partial
/// change sets. Values are arbitrary JSON (nested objects and arrays included).
pub type FieldMap = std::collections::BTreeMap<String, Value>;

/// Lifecycle status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Being edited by the applicant; autosave writes land here.
    Draft,
    /// Finalized by the applicant, awaiting review.
    Submitted,
    /// Picked up by a reviewer.
    UnderReview,
    /// Review finished with approval.
    Approved,
    /// Review finished with rejection.
    Rejected,
    /// Placed on a waitlist.
    Waitlisted,
    /// Withdrawn by the applicant after submitting.
    Withdrawn,
}

impl SubmissionStatus {
    /// Wire/display name (snake_case, matching the serialized form).
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "draft",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Waitlisted => "waitlisted",
            SubmissionStatus::Withdrawn => "withdrawn",
        }
    }
}

/// How a version history entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Partial field-level save from the debounced autosave path.
    Autosave,
    /// Full-data save explicitly requested by the user.
    ManualSave,
    /// Final submission.
    Submit,
    /// A previous version copied forward.
    Restore,
}

/// A form submission as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Form this submission answers.
    pub form_id: String,
    /// Current lifecycle status.
    pub status: SubmissionStatus,
    /// Field values, keyed by field identifier.
    pub data: FieldMap,
    /// Optimistic-concurrency token, incremented by the store on every write.
    pub version: i64,
    /// When the submission was finalized, if it has been.
    pub submitted_at: Option<DateTime<Utc>>,
    /// When the last autosave or restore landed.
    pub last_autosave_at: Option<DateTime<Utc>>,
    /// When the submission was created.
    pub created_at: DateTime<Utc>,
    /// When the submission was last written.
    pub updated_at: DateTime<Utc>,
}

/// A snapshot of a submission at one version, kept for history and restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Unique identifier of the history entry.
    pub id: Uuid,
    /// Submission this snapshot belongs to.
    pub submission_id: Uuid,
    /// Version the submission reached with this write.
    pub version: i64,
    /// Full data as of this version.
    pub data: FieldMap,
    /// Fields touched by this write (None for full-data writes).
    pub changed_fields: Option<Vec<String>>,
    /// What kind of write produced this entry.
    pub change_type: ChangeType,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// Result of a partial autosave write.
#[derive(Debug, Clone, PartialEq)]
pub enum AutosaveOutcome {
    /// Changes merged; the submission advanced to `version`.
    Saved {
        /// New server-assigned version.
        version: i64,
        /// When the write was recorded.
        saved_at: DateTime<Utc>,
    },
    /// The client's base version is stale. Nothing was written; the caller
    /// receives the authoritative state instead.
    Conflict {
        /// Version currently stored.
        server_version: i64,
        /// Full current data of the submission.
        server_data: FieldMap,
    },
}

impl AutosaveOutcome {
    /// True if this outcome is a version conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AutosaveOutcome::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&SubmissionStatus::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");
        let back: SubmissionStatus = serde_json::from_str("\"withdrawn\"").unwrap();
        assert_eq!(back, SubmissionStatus::Withdrawn);
    }

    #[test]
    fn test_status_as_str_matches_serde() {
        for status in [
            SubmissionStatus::Draft,
            SubmissionStatus::Submitted,
            SubmissionStatus::UnderReview,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
            SubmissionStatus::Waitlisted,
            SubmissionStatus::Withdrawn,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_change_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ChangeType::ManualSave).unwrap(),
            "\"manual_save\""
        );
    }

    #[test]
    fn test_outcome_is_conflict() {
        let saved = AutosaveOutcome::Saved {
            version: 2,
            saved_at: Utc::now(),
        };
        assert!(!saved.is_conflict());

        let conflict = AutosaveOutcome::Conflict {
            server_version: 5,
            server_data: FieldMap::new(),
        };
        assert!(conflict.is_conflict());
    }
}
