// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

use crate::config::WatchedKinds;
use crate::resource::ResourceKind;

#[test]
fn watched_kinds_all_contains_both_kinds() {
    let kinds = WatchedKinds::all();
    assert!(kinds.contains(ResourceKind::StandardIngress));
    assert!(kinds.contains(ResourceKind::RouteObject));
}

#[test]
fn watched_kinds_default_contains_neither_kind() {
    let kinds = WatchedKinds::default();
    assert!(!kinds.contains(ResourceKind::StandardIngress));
    assert!(!kinds.contains(ResourceKind::RouteObject));
}

#[test]
fn watched_kinds_can_be_enabled_independently() {
    let mut kinds = WatchedKinds::default();
    kinds.standard_ingress = true;
    assert!(kinds.contains(ResourceKind::StandardIngress));
    assert!(!kinds.contains(ResourceKind::RouteObject));
}
