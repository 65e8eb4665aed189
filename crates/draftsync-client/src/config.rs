// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Session and HTTP backend configuration.

use std::env;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Timing and behavior knobs for a [`DraftSession`](crate::DraftSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle window after the last edit before an autosave fires
    /// (default: 2000 ms).
    pub debounce: Duration,
    /// Upper bound on one autosave round-trip; a stalled call releases the
    /// in-flight slot and surfaces a timeout error (default: 30_000 ms).
    pub request_timeout: Duration,
    /// Delay before retrying after a failed save, so unsent changes are not
    /// stranded until the next edit (default: 5000 ms).
    pub retry_backoff: Duration,
    /// When false, edits are tracked but never sent (default: true).
    pub enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2_000),
            request_timeout: Duration::from_millis(30_000),
            retry_backoff: Duration::from_millis(5_000),
            enabled: true,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `DRAFTSYNC_DEBOUNCE_MS` (default: 2000)
    /// - `DRAFTSYNC_REQUEST_TIMEOUT_MS` (default: 30000)
    /// - `DRAFTSYNC_RETRY_BACKOFF_MS` (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let debounce = env::var("DRAFTSYNC_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);

        let request_timeout = env::var("DRAFTSYNC_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);

        let retry_backoff = env::var("DRAFTSYNC_RETRY_BACKOFF_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_backoff);

        Self {
            debounce,
            request_timeout,
            retry_backoff,
            enabled: true,
        }
    }

    /// Set the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the retry backoff.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Enable or disable sending entirely.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Configuration for the HTTP backend.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API base URL, e.g. `https://api.example.com/api/v1`.
    pub base_url: String,
    /// Bearer token sent in the `Authorization` header, if any.
    pub bearer_token: Option<String>,
    /// Per-request timeout applied at the HTTP client level
    /// (default: 30_000 ms).
    pub request_timeout: Duration,
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Create a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            request_timeout: Duration::from_millis(30_000),
        }
    }

    /// Create a configuration for local development
    /// (`http://127.0.0.1:8080/api/v1`).
    pub fn localhost() -> Self {
        Self::new("http://127.0.0.1:8080/api/v1")
    }

    /// Load configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `DRAFTSYNC_BASE_URL` - API base URL
    ///
    /// # Optional Environment Variables
    /// - `DRAFTSYNC_API_TOKEN` - Bearer token
    /// - `DRAFTSYNC_REQUEST_TIMEOUT_MS` - Request timeout (default: 30000)
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("DRAFTSYNC_BASE_URL")
            .map_err(|_| ClientError::Config("DRAFTSYNC_BASE_URL is required".to_string()))?;

        let bearer_token = env::var("DRAFTSYNC_API_TOKEN").ok();

        let request_timeout = env::var("DRAFTSYNC_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(30_000));

        Ok(Self {
            base_url,
            bearer_token,
            request_timeout,
        })
    }

    /// Set the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(2_000));
        assert_eq!(config.request_timeout, Duration::from_millis(30_000));
        assert_eq!(config.retry_backoff, Duration::from_millis(5_000));
        assert!(config.enabled);
    }

    #[test]
    fn test_session_builder_chain() {
        let config = SessionConfig::new()
            .with_debounce(Duration::from_millis(300))
            .with_request_timeout(Duration::from_secs(5))
            .with_retry_backoff(Duration::from_secs(1))
            .with_enabled(false);

        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.retry_backoff, Duration::from_secs(1));
        assert!(!config.enabled);
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_localhost() {
        let config = HttpConfig::localhost();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/v1");
        assert!(config.bearer_token.is_none());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_builder() {
        let config = HttpConfig::new("https://api.example.com/api/v1")
            .with_bearer_token("tok")
            .with_request_timeout(Duration::from_secs(10));

        assert_eq!(config.bearer_token.as_deref(), Some("tok"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
