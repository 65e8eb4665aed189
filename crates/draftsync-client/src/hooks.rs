// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Observer callbacks for save outcomes.
//!
//! All failures and conflicts surface through these hooks rather than by
//! panicking or throwing across the async boundary, so a bad save can never
//! take the host surface down with it.

use draftsync_store::FieldMap;

use crate::error::ClientError;

type SaveSuccessFn = dyn Fn(i64) + Send + Sync;
type ConflictFn = dyn Fn(&FieldMap, i64) + Send + Sync;
type SaveErrorFn = dyn Fn(&ClientError) + Send + Sync;

/// Optional callbacks invoked by a [`DraftSession`](crate::DraftSession).
#[derive(Default)]
pub struct SessionHooks {
    on_save_success: Option<Box<SaveSuccessFn>>,
    on_conflict: Option<Box<ConflictFn>>,
    on_save_error: Option<Box<SaveErrorFn>>,
}

impl SessionHooks {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the new server version after every successful save.
    pub fn on_save_success(mut self, f: impl Fn(i64) + Send + Sync + 'static) -> Self {
        self.on_save_success = Some(Box::new(f));
        self
    }

    /// Called with the server's data and version when a conflict is detected,
    /// before local state is replaced. Use this to show a diff or a warning.
    pub fn on_conflict(mut self, f: impl Fn(&FieldMap, i64) + Send + Sync + 'static) -> Self {
        self.on_conflict = Some(Box::new(f));
        self
    }

    /// Called when a save fails (transport error or timeout). Pending changes
    /// are retained and will be retried.
    pub fn on_save_error(mut self, f: impl Fn(&ClientError) + Send + Sync + 'static) -> Self {
        self.on_save_error = Some(Box::new(f));
        self
    }

    pub(crate) fn notify_save_success(&self, version: i64) {
        if let Some(f) = &self.on_save_success {
            f(version);
        }
    }

    pub(crate) fn notify_conflict(&self, server_data: &FieldMap, server_version: i64) {
        if let Some(f) = &self.on_conflict {
            f(server_data, server_version);
        }
    }

    pub(crate) fn notify_save_error(&self, error: &ClientError) {
        if let Some(f) = &self.on_save_error {
            f(error);
        }
    }
}

impl std::fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHooks")
            .field("on_save_success", &self.on_save_success.is_some())
            .field("on_conflict", &self.on_conflict.is_some())
            .field("on_save_error", &self.on_save_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_empty_hooks_are_noops() {
        let hooks = SessionHooks::new();
        hooks.notify_save_success(1);
        hooks.notify_conflict(&FieldMap::new(), 2);
        hooks.notify_save_error(&ClientError::Transport("x".into()));
    }

    #[test]
    fn test_hooks_receive_arguments() {
        let seen = Arc::new(AtomicI64::new(0));
        let version = seen.clone();
        let hooks = SessionHooks::new().on_save_success(move |v| {
            version.store(v, Ordering::SeqCst);
        });

        hooks.notify_save_success(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }
}
