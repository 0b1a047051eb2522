// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ledger.rs`

use crate::hostname::Hostname;
use crate::ledger::{ClaimOutcome, Ledger, ReleaseOutcome};
use crate::resource::{ResourceKey, ResourceKind};

fn key(name: &str) -> ResourceKey {
    ResourceKey::new(ResourceKind::StandardIngress, "default", name)
}

fn host(s: &str) -> Hostname {
    Hostname::parse(s).unwrap()
}

#[test]
fn claim_on_an_unclaimed_host_grants_ownership() {
    let ledger = Ledger::new();
    let owner = key("web");
    assert_eq!(ledger.claim(&host("a.example.com"), &owner), ClaimOutcome::Granted);
    assert_eq!(ledger.owner_of(&host("a.example.com")), Some(owner));
}

#[test]
fn claim_by_the_current_owner_is_idempotent() {
    let ledger = Ledger::new();
    let owner = key("web");
    let h = host("a.example.com");
    assert_eq!(ledger.claim(&h, &owner), ClaimOutcome::Granted);
    assert_eq!(ledger.claim(&h, &owner), ClaimOutcome::Granted);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn claim_by_a_second_resource_is_refused() {
    let ledger = Ledger::new();
    let first = key("web");
    let second = key("other");
    let h = host("a.example.com");

    assert_eq!(ledger.claim(&h, &first), ClaimOutcome::Granted);
    assert_eq!(ledger.claim(&h, &second), ClaimOutcome::AlreadyOwnedBy(first));
}

#[test]
fn release_by_the_owner_frees_the_hostname() {
    let ledger = Ledger::new();
    let owner = key("web");
    let h = host("a.example.com");

    ledger.claim(&h, &owner);
    assert_eq!(ledger.release(&h, &owner), ReleaseOutcome::Released);
    assert_eq!(ledger.owner_of(&h), None);
}

#[test]
fn release_by_a_non_owner_is_refused_and_leaves_ownership_intact() {
    let ledger = Ledger::new();
    let owner = key("web");
    let intruder = key("other");
    let h = host("a.example.com");

    ledger.claim(&h, &owner);
    assert_eq!(ledger.release(&h, &intruder), ReleaseOutcome::NotOwner);
    assert_eq!(ledger.owner_of(&h), Some(owner));
}

#[test]
fn release_of_an_absent_hostname_reports_absent() {
    let ledger = Ledger::new();
    let owner = key("web");
    assert_eq!(ledger.release(&host("never-claimed.example.com"), &owner), ReleaseOutcome::Absent);
}

#[test]
fn owned_by_returns_only_that_resources_hostnames() {
    let ledger = Ledger::new();
    let web = key("web");
    let api = key("api");

    ledger.claim(&host("a.example.com"), &web);
    ledger.claim(&host("b.example.com"), &web);
    ledger.claim(&host("c.example.com"), &api);

    let mut owned: Vec<String> = ledger.owned_by(&web).iter().map(Hostname::as_str).map(str::to_string).collect();
    owned.sort();
    assert_eq!(owned, vec!["a.example.com".to_string(), "b.example.com".to_string()]);
}

#[test]
fn snapshot_and_len_reflect_current_state() {
    let ledger = Ledger::new();
    assert!(ledger.is_empty());

    let owner = key("web");
    ledger.claim(&host("a.example.com"), &owner);
    ledger.claim(&host("b.example.com"), &owner);

    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.snapshot().len(), 2);
}
