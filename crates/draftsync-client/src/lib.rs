// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Draftsync client - Optimistic autosave for form drafts.
//!
//! This crate provides the editing-side half of Draftsync: a session object
//! that tracks field-level changes against a saved baseline, coalesces bursts
//! of edits behind a debounce timer, ships minimal deltas to a backend, and
//! detects concurrent modification through server-authoritative versioning.
//!
//! # Features
//!
//! - **Change Tracking**: Field-level deltas against the last-saved baseline,
//!   with structural equality so reverted edits drop out of the payload
//! - **Debounced Autosave**: One save per idle window, however fast the user
//!   types; each edit resets the timer rather than extending it
//! - **Single-Flight**: At most one save request in flight per draft
//! - **Conflict Detection**: Every save carries the base version; a newer
//!   server version yields a conflict and the session adopts server state
//! - **Retry**: Failed saves keep their changes pending and re-arm on backoff
//! - **Pluggable Backends**: An HTTP backend for the REST API and a store
//!   backend that runs against any [`SubmissionStore`] in process
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use draftsync_client::{DraftSession, HttpBackend, HttpConfig, SessionHooks};
//!
//! #[tokio::main]
//! async fn main() -> draftsync_client::Result<()> {
//!     let backend = Arc::new(HttpBackend::new(HttpConfig::from_env()?)?);
//!
//!     let hooks = SessionHooks::new()
//!         .on_save_success(|version| println!("saved at v{version}"))
//!         .on_conflict(|_server_data, server_version| {
//!             println!("overwritten elsewhere, now at v{server_version}");
//!         });
//!
//!     let session = DraftSession::with_options(
//!         backend,
//!         submission_id,
//!         initial_data,
//!         initial_version,
//!         Default::default(),
//!         hooks,
//!     );
//!
//!     // Edits queue up; one debounce window later a single autosave fires.
//!     session.record_field_change("name", "Alice".into());
//!     session.record_field_change("email", "alice@example.com".into());
//!
//!     // Flush explicitly before navigating away.
//!     session.force_save().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Conflict Handling
//!
//! The session never merges. On conflict the server wins: pending local edits
//! are discarded, the baseline becomes the server document, and the session
//! continues from the server version. The `on_conflict` hook fires first so
//! the host can show the user what happened:
//!
//! ```ignore
//! let hooks = SessionHooks::new().on_conflict(|server_data, server_version| {
//!     // Surface a notice; the session has already adopted server state
//!     // by the time the user reads it.
//! });
//! ```
//!
//! # Configuration
//!
//! ## Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `DRAFTSYNC_BASE_URL` | Yes (HTTP) | - | API base URL |
//! | `DRAFTSYNC_API_TOKEN` | No | - | Bearer token |
//! | `DRAFTSYNC_DEBOUNCE_MS` | No | `2000` | Idle window before autosave |
//! | `DRAFTSYNC_REQUEST_TIMEOUT_MS` | No | `30000` | Per-request deadline |
//! | `DRAFTSYNC_RETRY_BACKOFF_MS` | No | `5000` | Delay before retrying a failed save |
//!
//! ## Programmatic Configuration
//!
//! ```ignore
//! use std::time::Duration;
//! use draftsync_client::SessionConfig;
//!
//! let config = SessionConfig::default()
//!     .with_debounce(Duration::from_millis(500))
//!     .with_retry_backoff(Duration::from_secs(10));
//! ```

mod config;
mod debounce;
mod error;
mod guard;
mod hooks;
mod session;
mod simple;
mod tracker;
mod types;

pub mod backend;

// Main types
pub use config::SessionConfig;
pub use error::{ClientError, Result};
pub use guard::UnloadGuard;
pub use hooks::SessionHooks;
pub use session::DraftSession;
pub use simple::{SimpleSaver, SIMPLE_SAVE_DELAY};
pub use tracker::ChangeTracker;
pub use types::{AutosaveReply, AutosaveRequest, DraftSnapshot, SaveState};

// Backends
pub use backend::store::StoreBackend;
pub use backend::AutosaveBackend;

#[cfg(feature = "http")]
pub use backend::http::HttpBackend;
#[cfg(feature = "http")]
pub use config::HttpConfig;

// Re-export the store contract so embedded callers need only this crate
pub use draftsync_store::{
    AutosaveOutcome, ChangeType, FieldMap, MemoryStore, SubmissionRecord, SubmissionStatus,
    SubmissionStore, VersionRecord,
};
