// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `remote.rs`, backed by `wiremock` rather than a live Technitium
//! server.

use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::backend::remote::{RemoteBackend, RemoteConfig};
use crate::backend::DnsBackend;

async fn backend_against(server: &MockServer) -> RemoteBackend {
    RemoteBackend::new(RemoteConfig {
        base_url: server.uri(),
        token: "test-token".to_string(),
        tls_verify: true,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn upsert_succeeds_on_a_plain_add_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/add"))
        .and(body_string_contains("domain=app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    let result = backend.upsert("example.com", "app", "10.0.0.1", 300).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn upsert_promotes_to_update_when_the_record_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "errorMessage": "Record already exists"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    let result = backend.upsert("example.com", "app", "10.0.0.1", 300).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn upsert_fails_when_the_promoted_update_also_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "errorMessage": "Record already exists"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "errorMessage": "zone is read-only"
        })))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    let result = backend.upsert("example.com", "app", "10.0.0.1", 300).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn delete_treats_record_not_found_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "errorMessage": "Record not found"
        })))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    let result = backend.delete("example.com", "app", "10.0.0.1").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn delete_succeeds_on_a_plain_ok_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    assert!(backend.delete("example.com", "app", "10.0.0.1").await.is_ok());
}

#[tokio::test]
async fn a_5xx_response_is_reported_as_a_retryable_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/add"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    let err = backend
        .upsert("example.com", "app", "10.0.0.1", 300)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn a_401_response_is_reported_as_a_non_retryable_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/add"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    let err = backend
        .upsert("example.com", "app", "10.0.0.1", 300)
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn ping_succeeds_against_the_session_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/session/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    assert!(backend.ping().await.is_ok());
}

#[tokio::test]
async fn malformed_response_body_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones/records/add"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let backend = backend_against(&server).await;
    let err = backend
        .upsert("example.com", "app", "10.0.0.1", 300)
        .await
        .unwrap_err();
    assert_eq!(err.kind_label(), "protocol");
}
