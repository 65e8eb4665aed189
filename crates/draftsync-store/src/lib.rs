// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Authoritative submission store for draftsync.
//!
//! This crate holds the server-side semantics the autosave client talks to:
//! submissions are versioned with a monotonically increasing integer, partial
//! saves are merged field-by-field under an optimistic version check, and every
//! write appends a snapshot to the submission's version history.
//!
//! The store is exposed through the [`SubmissionStore`] trait so deployments
//! can plug in their own persistence. [`MemoryStore`] is the bundled
//! implementation, suitable for tests and single-process embedding.
//!
//! # Versioning contract
//!
//! The store is the sole authority for `version`. A partial save carries the
//! client's `base_version`; if it no longer matches the stored version the
//! write is rejected and the caller receives the full current server state
//! instead ([`AutosaveOutcome::Conflict`]). Clients never self-assign versions.
//!
//! ```ignore
//! use draftsync_store::{MemoryStore, SubmissionStore};
//!
//! let store = MemoryStore::new();
//! let draft = store.start("user-1", "form-1").await?;
//!
//! let outcome = store
//!     .autosave(draft.id, changes, draft.version)
//!     .await?;
//! ```

mod error;
mod memory;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::SubmissionStore;
pub use types::{
    AutosaveOutcome, ChangeType, FieldMap, SubmissionRecord, SubmissionStatus, VersionRecord,
};
