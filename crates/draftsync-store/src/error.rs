// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the submission store.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the submission store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Submission was not found.
    #[error("submission not found: {submission_id}")]
    NotFound {
        /// The submission ID that was not found.
        submission_id: Uuid,
    },

    /// Requested history version does not exist for the submission.
    #[error("version {version} not found for submission {submission_id}")]
    VersionNotFound {
        /// The submission ID.
        submission_id: Uuid,
        /// The version that was requested.
        version: i64,
    },

    /// Submission is in the wrong state for the requested operation.
    #[error("submission {submission_id} is {actual}, expected {expected}")]
    InvalidState {
        /// The submission ID.
        submission_id: Uuid,
        /// The status required by the operation.
        expected: String,
        /// The submission's current status.
        actual: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
