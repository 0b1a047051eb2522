// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `route.rs`

use crate::route::{RouteEntry, RouteObjectSpec};

#[test]
fn route_object_spec_defaults_to_an_empty_route_list() {
    let spec = RouteObjectSpec::default();
    assert!(spec.routes.is_empty());
}

#[test]
fn route_entry_serializes_match_under_the_match_key() {
    let entry = RouteEntry {
        kind: "Rule".to_string(),
        match_expr: "Host(`a.example.com`)".to_string(),
    };
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["match"], "Host(`a.example.com`)");
    assert_eq!(value["kind"], "Rule");
}

#[test]
fn route_entry_deserializes_from_the_match_key() {
    let json = serde_json::json!({"kind": "Rule", "match": "Host(`b.example.com`)"});
    let entry: RouteEntry = serde_json::from_value(json).unwrap();
    assert_eq!(entry.match_expr, "Host(`b.example.com`)");
}

#[test]
fn route_entry_kind_defaults_when_absent() {
    let json = serde_json::json!({"match": "Host(`c.example.com`)"});
    let entry: RouteEntry = serde_json::from_value(json).unwrap();
    assert_eq!(entry.kind, "");
}
