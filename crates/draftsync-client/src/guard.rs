// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Leave-the-surface guard over a draft session.

use crate::error::Result;
use crate::session::DraftSession;
use crate::types::SaveState;

/// Exit guard for a draft session.
///
/// Hosts ask [`should_block`](Self::should_block) before tearing the editing
/// surface down and either warn the user or [`flush`](Self::flush) first. The
/// guard holds a session handle, so it stays valid for as long as the host
/// keeps it.
#[derive(Clone)]
pub struct UnloadGuard {
    session: DraftSession,
}

impl UnloadGuard {
    pub(crate) fn new(session: DraftSession) -> Self {
        Self { session }
    }

    /// True when leaving now would abandon unsaved or in-flight changes.
    pub fn should_block(&self) -> bool {
        !matches!(self.session.save_state(), SaveState::Clean)
    }

    /// Warning message for the host's leave prompt, when one is warranted.
    pub fn check(&self) -> Option<String> {
        self.should_block()
            .then(|| "You have unsaved changes. Are you sure you want to leave?".to_string())
    }

    /// Flush outstanding changes so the host can exit cleanly.
    pub async fn flush(&self) -> Result<()> {
        self.session.force_save().await
    }
}
