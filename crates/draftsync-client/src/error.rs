// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client-side error types.
//!
//! A version conflict is deliberately NOT an error here. It is an expected
//! outcome of optimistic saving and travels as
//! [`AutosaveOutcome::Conflict`](draftsync_store::AutosaveOutcome) instead.

use draftsync_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the autosave client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Configuration error (missing or invalid environment variable).
    #[error("configuration error: {0}")]
    Config(String),

    /// The network call itself failed (connect, I/O, malformed transport).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the client waited before giving up.
        elapsed_ms: u64,
    },

    /// Server returned a non-success, non-conflict response.
    #[error("server error: {status} - {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Error from an embedded submission store backend.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

/// Type alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;
