// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `local_hosts.rs`

use crate::backend::local_hosts::{LocalHostsConfig, LocalHostsFileBackend};
use crate::backend::DnsBackend;
use crate::constants::{HOSTS_BLOCK_BEGIN, HOSTS_BLOCK_END};

async fn backend_over(dir: &tempfile::TempDir) -> (LocalHostsFileBackend, std::path::PathBuf) {
    let hosts_path = dir.path().join("hosts");
    let backend = LocalHostsFileBackend::new(LocalHostsConfig {
        hosts_path: hosts_path.clone(),
    })
    .await
    .unwrap();
    (backend, hosts_path)
}

#[tokio::test]
async fn new_on_a_missing_file_starts_with_no_entries_and_does_not_create_it() {
    let dir = tempfile::tempdir().unwrap();
    let (_, hosts_path) = backend_over(&dir).await;
    assert!(!hosts_path.exists());
}

#[tokio::test]
async fn upsert_writes_a_managed_block_containing_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, hosts_path) = backend_over(&dir).await;

    backend.upsert("example.com", "app", "10.0.0.1", 300).await.unwrap();

    let content = tokio::fs::read_to_string(&hosts_path).await.unwrap();
    assert!(content.contains(HOSTS_BLOCK_BEGIN));
    assert!(content.contains(HOSTS_BLOCK_END));
    assert!(content.contains("10.0.0.1  app.example.com"));
}

#[tokio::test]
async fn upsert_is_idempotent_when_applied_twice() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, hosts_path) = backend_over(&dir).await;

    backend.upsert("example.com", "app", "10.0.0.1", 300).await.unwrap();
    backend.upsert("example.com", "app", "10.0.0.1", 300).await.unwrap();

    let content = tokio::fs::read_to_string(&hosts_path).await.unwrap();
    assert_eq!(content.matches("app").count(), 1);
}

#[tokio::test]
async fn delete_removes_the_entry_but_preserves_the_block() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, hosts_path) = backend_over(&dir).await;

    backend.upsert("example.com", "app", "10.0.0.1", 300).await.unwrap();
    backend.delete("example.com", "app", "10.0.0.1").await.unwrap();

    let content = tokio::fs::read_to_string(&hosts_path).await.unwrap();
    assert!(!content.contains("10.0.0.1  app.example.com"));
    assert!(content.contains(HOSTS_BLOCK_BEGIN));
}

#[tokio::test]
async fn delete_of_an_absent_entry_succeeds_without_rewriting() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, hosts_path) = backend_over(&dir).await;

    assert!(backend.delete("example.com", "nope", "10.0.0.1").await.is_ok());
    assert!(!hosts_path.exists());
}

#[tokio::test]
async fn rewrite_preserves_content_outside_the_managed_block() {
    let dir = tempfile::tempdir().unwrap();
    let hosts_path = dir.path().join("hosts");
    tokio::fs::write(&hosts_path, "127.0.0.1  localhost\n::1  localhost\n")
        .await
        .unwrap();

    let backend = LocalHostsFileBackend::new(LocalHostsConfig {
        hosts_path: hosts_path.clone(),
    })
    .await
    .unwrap();
    backend.upsert("example.com", "app", "10.0.0.1", 300).await.unwrap();

    let content = tokio::fs::read_to_string(&hosts_path).await.unwrap();
    assert!(content.contains("127.0.0.1  localhost"));
    assert!(content.contains("10.0.0.1  app.example.com"));
}

#[tokio::test]
async fn new_seeds_its_model_from_an_existing_managed_block() {
    let dir = tempfile::tempdir().unwrap();
    let hosts_path = dir.path().join("hosts");
    let preexisting = format!("{HOSTS_BLOCK_BEGIN}\n10.0.0.5  old\n{HOSTS_BLOCK_END}\n");
    tokio::fs::write(&hosts_path, preexisting).await.unwrap();

    let backend = LocalHostsFileBackend::new(LocalHostsConfig {
        hosts_path: hosts_path.clone(),
    })
    .await
    .unwrap();
    backend.upsert("example.com", "new", "10.0.0.6", 300).await.unwrap();

    let content = tokio::fs::read_to_string(&hosts_path).await.unwrap();
    assert!(content.contains("10.0.0.5  old"));
    assert!(content.contains("10.0.0.6  new.example.com"));
}

#[tokio::test]
async fn upsert_of_the_apex_token_writes_the_bare_zone_as_the_hostname() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, hosts_path) = backend_over(&dir).await;

    backend.upsert("example.com", "@", "10.0.0.1", 300).await.unwrap();

    let content = tokio::fs::read_to_string(&hosts_path).await.unwrap();
    assert!(content.contains("10.0.0.1  example.com"));
}

#[tokio::test]
async fn ping_on_a_missing_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, _) = backend_over(&dir).await;
    assert!(backend.ping().await.is_ok());
}

#[tokio::test]
async fn ping_on_an_existing_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, _) = backend_over(&dir).await;
    backend.upsert("example.com", "app", "10.0.0.1", 300).await.unwrap();
    assert!(backend.ping().await.is_ok());
}
