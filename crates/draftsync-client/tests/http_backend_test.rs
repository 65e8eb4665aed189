// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP backend tests against a mock submissions API.

#![cfg(feature = "http")]

use draftsync_client::{
    AutosaveBackend, AutosaveOutcome, ClientError, FieldMap, HttpBackend, HttpConfig,
    SubmissionStatus,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fields(pairs: &[(&str, serde_json::Value)]) -> FieldMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn record_body(id: Uuid, version: i64) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": "user-1",
        "form_id": "form-1",
        "status": "draft",
        "data": {"name": "Alice"},
        "version": version,
        "submitted_at": null,
        "last_autosave_at": "2025-06-15T12:00:00Z",
        "created_at": "2025-06-15T11:00:00Z",
        "updated_at": "2025-06-15T12:00:00Z"
    })
}

#[tokio::test]
async fn test_autosave_sends_delta_and_base_version() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/submissions/{id}/autosave")))
        .and(body_json(json!({
            "changes": {"name": "Alice"},
            "base_version": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": 4,
            "saved_at": "2025-06-15T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(HttpConfig::new(server.uri())).unwrap();
    let outcome = backend
        .autosave(id, fields(&[("name", json!("Alice"))]), 3)
        .await
        .unwrap();

    match outcome {
        AutosaveOutcome::Saved { version, .. } => assert_eq!(version, 4),
        other => panic!("expected Saved, got {other:?}"),
    }
}

#[tokio::test]
async fn test_conflict_response_decodes_to_conflict() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/submissions/{id}/autosave")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "conflict": true,
            "server_version": 7,
            "server_data": {"name": "someone else's edit"}
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(HttpConfig::new(server.uri())).unwrap();
    let outcome = backend
        .autosave(id, fields(&[("name", json!("mine"))]), 5)
        .await
        .unwrap();

    match outcome {
        AutosaveOutcome::Conflict {
            server_version,
            server_data,
        } => {
            assert_eq!(server_version, 7);
            assert_eq!(
                server_data.get("name"),
                Some(&json!("someone else's edit"))
            );
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/submissions/{id}/autosave")))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": 2,
            "saved_at": "2025-06-15T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpConfig::new(server.uri()).with_bearer_token("secret-token");
    let backend = HttpBackend::new(config).unwrap();
    backend
        .autosave(id, fields(&[("a", json!(1))]), 1)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_error_surfaces_message() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/submissions/{id}/autosave")))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let backend = HttpBackend::new(HttpConfig::new(server.uri())).unwrap();
    let err = backend
        .autosave(id, fields(&[("a", json!(1))]), 1)
        .await
        .unwrap_err();

    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Server, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_save_returns_updated_record() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PUT"))
        .and(path(format!("/submissions/{id}")))
        .and(body_json(json!({
            "data": {"name": "Alice"},
            "version": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_body(id, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(HttpConfig::new(server.uri())).unwrap();
    let outcome = backend
        .save(id, fields(&[("name", json!("Alice"))]), Some(2))
        .await
        .unwrap();

    match outcome {
        AutosaveOutcome::Saved { version, .. } => assert_eq!(version, 3),
        other => panic!("expected Saved, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_and_restore_routes() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    let mut submitted = record_body(id, 4);
    submitted["status"] = json!("submitted");
    submitted["submitted_at"] = json!("2025-06-15T13:00:00Z");

    Mock::given(method("POST"))
        .and(path(format!("/submissions/{id}/submit")))
        .respond_with(ResponseTemplate::new(200).set_body_json(submitted))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/submissions/{id}/restore/2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_body(id, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(HttpConfig::new(server.uri())).unwrap();

    let record = backend.submit(id).await.unwrap();
    assert_eq!(record.status, SubmissionStatus::Submitted);
    assert_eq!(record.version, 4);

    let restored = backend.restore(id, 2).await.unwrap();
    assert_eq!(restored.version, 5);
}

#[tokio::test]
async fn test_versions_route_decodes_history() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/submissions/{id}/versions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "submission_id": id,
                "version": 3,
                "data": {"name": "Alice"},
                "changed_fields": ["name"],
                "change_type": "autosave",
                "created_at": "2025-06-15T12:00:00Z"
            },
            {
                "id": Uuid::new_v4(),
                "submission_id": id,
                "version": 2,
                "data": {},
                "changed_fields": null,
                "change_type": "manual_save",
                "created_at": "2025-06-15T11:30:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(HttpConfig::new(server.uri())).unwrap();
    let versions = backend.versions(id).await.unwrap();

    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version, 3);
    assert_eq!(versions[0].changed_fields, Some(vec!["name".to_string()]));
}
