// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `zone.rs`

use crate::hostname::Hostname;
use crate::zone::{in_zone, subdomain};

#[test]
fn in_zone_is_true_for_the_apex() {
    let host = Hostname::parse("example.com").unwrap();
    assert!(in_zone(&host, "example.com"));
}

#[test]
fn in_zone_is_true_for_a_direct_subdomain() {
    let host = Hostname::parse("app.example.com").unwrap();
    assert!(in_zone(&host, "example.com"));
}

#[test]
fn in_zone_is_true_for_a_nested_subdomain() {
    let host = Hostname::parse("api.staging.example.com").unwrap();
    assert!(in_zone(&host, "example.com"));
}

#[test]
fn in_zone_is_false_for_an_unrelated_zone() {
    let host = Hostname::parse("app.example.org").unwrap();
    assert!(!in_zone(&host, "example.com"));
}

#[test]
fn in_zone_is_false_for_a_suffix_that_is_not_a_dot_boundary() {
    let host = Hostname::parse("notexample.com").unwrap();
    assert!(!in_zone(&host, "example.com"));
}

#[test]
fn subdomain_of_the_apex_is_the_apex_token() {
    let host = Hostname::parse("example.com").unwrap();
    assert_eq!(subdomain(&host, "example.com"), "@");
}

#[test]
fn subdomain_strips_the_zone_suffix() {
    let host = Hostname::parse("app.example.com").unwrap();
    assert_eq!(subdomain(&host, "example.com"), "app");
}

#[test]
fn subdomain_of_a_nested_name_keeps_the_inner_labels() {
    let host = Hostname::parse("api.staging.example.com").unwrap();
    assert_eq!(subdomain(&host, "example.com"), "api.staging");
}

#[test]
fn subdomain_strips_the_zone_suffix_only_once_when_the_zone_name_recurs_as_a_label() {
    let host = Hostname::parse("x.talos00.talos00").unwrap();
    assert_eq!(subdomain(&host, "talos00"), "x.talos00");
}
