// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP backend for a remote submissions API.
//!
//! Routes follow the submissions REST surface:
//! `POST /submissions/{id}/autosave`, `PUT /submissions/{id}`,
//! `POST /submissions/{id}/submit`, `GET /submissions/{id}/versions`,
//! `POST /submissions/{id}/restore/{version}`.
//!
//! A `409 Conflict` response carries the authoritative server state in its
//! body and decodes to [`AutosaveOutcome::Conflict`], an expected outcome
//! rather than an error.

use async_trait::async_trait;
use draftsync_store::{AutosaveOutcome, FieldMap, SubmissionRecord, VersionRecord};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::AutosaveBackend;
use crate::config::HttpConfig;
use crate::error::{ClientError, Result};
use crate::types::{AutosaveRequest, AutosaveReply};

#[derive(Serialize)]
struct SaveRequest {
    data: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i64>,
}

/// Backend speaking to a submissions API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpBackend {
    /// Create a backend for the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let builder = self.client.request(method, url);
        match &self.config.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Turn a non-success, non-conflict response into a server error,
    /// preferring the `error` field of a JSON body.
    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(body) => serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body),
            Err(e) => e.to_string(),
        };
        warn!(status, %message, "Server rejected request");
        ClientError::Server { status, message }
    }

    async fn outcome_from(response: reqwest::Response) -> Result<AutosaveOutcome> {
        match response.status() {
            status if status.is_success() || status == StatusCode::CONFLICT => {
                let reply: AutosaveReply = response.json().await?;
                reply.into_outcome()
            }
            _ => Err(Self::error_from(response).await),
        }
    }
}

#[async_trait]
impl AutosaveBackend for HttpBackend {
    #[instrument(skip(self, changes), fields(%submission_id, base_version, change_count = changes.len()))]
    async fn autosave(
        &self,
        submission_id: Uuid,
        changes: FieldMap,
        base_version: i64,
    ) -> Result<AutosaveOutcome> {
        let body = AutosaveRequest {
            changes,
            base_version,
        };
        let response = self
            .request(Method::POST, &format!("/submissions/{submission_id}/autosave"))
            .json(&body)
            .send()
            .await?;

        let outcome = Self::outcome_from(response).await?;
        debug!(conflict = outcome.is_conflict(), "Autosave round-trip complete");
        Ok(outcome)
    }

    #[instrument(skip(self, data), fields(%submission_id, field_count = data.len()))]
    async fn save(
        &self,
        submission_id: Uuid,
        data: FieldMap,
        version: Option<i64>,
    ) -> Result<AutosaveOutcome> {
        let response = self
            .request(Method::PUT, &format!("/submissions/{submission_id}"))
            .json(&SaveRequest { data, version })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                // Full save returns the updated submission, not an autosave reply.
                let record: SubmissionRecord = response.json().await?;
                Ok(AutosaveOutcome::Saved {
                    version: record.version,
                    saved_at: record.updated_at,
                })
            }
            StatusCode::CONFLICT => {
                let reply: AutosaveReply = response.json().await?;
                reply.into_outcome()
            }
            _ => Err(Self::error_from(response).await),
        }
    }

    #[instrument(skip(self), fields(%submission_id))]
    async fn submit(&self, submission_id: Uuid) -> Result<SubmissionRecord> {
        let response = self
            .request(Method::POST, &format!("/submissions/{submission_id}/submit"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    #[instrument(skip(self), fields(%submission_id))]
    async fn versions(&self, submission_id: Uuid) -> Result<Vec<VersionRecord>> {
        let response = self
            .request(Method::GET, &format!("/submissions/{submission_id}/versions"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    #[instrument(skip(self), fields(%submission_id, version))]
    async fn restore(&self, submission_id: Uuid, version: i64) -> Result<SubmissionRecord> {
        let response = self
            .request(
                Method::POST,
                &format!("/submissions/{submission_id}/restore/{version}"),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }
}
