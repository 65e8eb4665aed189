// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wire and state types for the client.

use chrono::{DateTime, Utc};
use draftsync_store::{AutosaveOutcome, FieldMap};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Where a draft sits in the save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// No pending changes.
    Clean,
    /// Pending changes exist; a save will fire after the idle window.
    Dirty,
    /// An autosave round-trip is in flight.
    Saving,
}

/// Read-only view of a draft session's current state.
#[derive(Debug, Clone)]
pub struct DraftSnapshot {
    /// Visible form data (last-saved baseline plus local edits).
    pub form_data: FieldMap,
    /// Last-seen server version.
    pub version: i64,
    /// When the last successful save was confirmed.
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Current position in the save cycle.
    pub state: SaveState,
}

/// Request body for `POST /submissions/{id}/autosave`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveRequest {
    /// Only the fields that changed since the last confirmed save.
    pub changes: FieldMap,
    /// The client's last-seen version, checked by the server.
    pub base_version: i64,
}

/// Response body for `POST /submissions/{id}/autosave`.
///
/// On success the server sends `version` and `saved_at`; on a version
/// conflict it sends `conflict: true` with the authoritative data and
/// version instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveReply {
    /// New version after a successful save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    /// Server timestamp of the successful save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    /// True when the client's base version was stale.
    #[serde(default)]
    pub conflict: bool,
    /// Authoritative data, present on conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_data: Option<FieldMap>,
    /// Authoritative version, present on conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version: Option<i64>,
}

impl AutosaveReply {
    /// Interpret the wire reply as an outcome.
    pub fn into_outcome(self) -> Result<AutosaveOutcome> {
        if self.conflict || self.server_version.is_some() {
            let server_version = self.server_version.ok_or_else(|| {
                ClientError::Serialization("conflict reply missing server_version".to_string())
            })?;
            return Ok(AutosaveOutcome::Conflict {
                server_version,
                server_data: self.server_data.unwrap_or_default(),
            });
        }

        let version = self
            .version
            .ok_or_else(|| ClientError::Serialization("save reply missing version".to_string()))?;
        let saved_at = self
            .saved_at
            .ok_or_else(|| ClientError::Serialization("save reply missing saved_at".to_string()))?;
        Ok(AutosaveOutcome::Saved { version, saved_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_reply_decodes_to_saved() {
        let reply: AutosaveReply =
            serde_json::from_value(json!({"version": 3, "saved_at": "2025-06-15T12:00:00Z"}))
                .unwrap();
        match reply.into_outcome().unwrap() {
            AutosaveOutcome::Saved { version, .. } => assert_eq!(version, 3),
            other => panic!("expected Saved, got {other:?}"),
        }
    }

    #[test]
    fn test_conflict_reply_decodes_to_conflict() {
        let reply: AutosaveReply = serde_json::from_value(json!({
            "conflict": true,
            "server_version": 5,
            "server_data": {"name": "Alice Smith"}
        }))
        .unwrap();
        match reply.into_outcome().unwrap() {
            AutosaveOutcome::Conflict {
                server_version,
                server_data,
            } => {
                assert_eq!(server_version, 5);
                assert_eq!(server_data.get("name"), Some(&json!("Alice Smith")));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_reply_is_an_error() {
        let reply: AutosaveReply = serde_json::from_value(json!({})).unwrap();
        assert!(reply.into_outcome().is_err());
    }

    #[test]
    fn test_request_round_trip() {
        let mut changes = FieldMap::new();
        changes.insert("name".to_string(), json!("Alice"));
        let request = AutosaveRequest {
            changes,
            base_version: 1,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["base_version"], json!(1));
        assert_eq!(value["changes"]["name"], json!("Alice"));
    }
}
