// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pure functions turning a watched object into `(ResourceKey, HostnameSet)`.
//!
//! Neither extractor ever fails: a malformed or empty object simply yields an empty
//! [`HostnameSet`].

use k8s_openapi::api::networking::v1::Ingress;

use crate::hostname::{Hostname, HostnameSet};
use crate::resource::{ResourceKey, ResourceKind};
use crate::route::RouteObject;

/// Extract hostnames from a standard `networking.k8s.io/v1` Ingress.
///
/// Reads `spec.rules[].host`; rules without a host, or with an empty/unparseable
/// host, contribute nothing.
#[must_use]
pub fn extract_standard_ingress(ingress: &Ingress) -> (ResourceKey, HostnameSet) {
    let meta = &ingress.metadata;
    let key = ResourceKey::new(
        ResourceKind::StandardIngress,
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    );

    let mut hosts = HostnameSet::new();
    if let Some(spec) = &ingress.spec {
        for rule in spec.rules.iter().flatten() {
            if let Some(host) = &rule.host {
                if let Some(parsed) = Hostname::parse(host) {
                    hosts.insert(parsed);
                }
            }
        }
    }
    (key, hosts)
}

/// Extract hostnames from a route object's match expressions.
///
/// Scans every route's `match` string for `Host(...)` occurrences, case-insensitive
/// on the `Host` token, tolerating symmetric quoting (backtick, single, double) and
/// surrounding whitespace. Multiple occurrences in one expression union together.
#[must_use]
pub fn extract_route_object(route: &RouteObject) -> (ResourceKey, HostnameSet) {
    let meta = &route.metadata;
    let key = ResourceKey::new(
        ResourceKind::RouteObject,
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    );

    let mut hosts = HostnameSet::new();
    for entry in &route.spec.routes {
        for literal in parse_host_literals(&entry.match_expr) {
            if let Some(parsed) = Hostname::parse(&literal) {
                hosts.insert(parsed);
            }
        }
    }
    (key, hosts)
}

/// Scan a match expression for every `Host(...)` literal, returning the raw
/// (unquoted, trimmed) argument text of each occurrence.
fn parse_host_literals(expr: &str) -> Vec<String> {
    let mut out = Vec::new();
    let bytes = expr.as_bytes();
    let lower = expr.to_ascii_lowercase();
    let lower_bytes = lower.as_bytes();
    let needle = b"host(";

    let mut idx = 0;
    while let Some(found) = find_subslice(&lower_bytes[idx..], needle) {
        let start = idx + found + needle.len();
        if let Some(end_rel) = find_subslice(&bytes[start..], b")") {
            let raw = &expr[start..start + end_rel];
            let trimmed = strip_quotes(raw.trim());
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            idx = start + end_rel + 1;
        } else {
            break;
        }
    }
    out
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Strip one layer of symmetric quoting (backtick, single, or double quote).
fn strip_quotes(s: &str) -> &str {
    let quotes = ['`', '\'', '"'];
    let mut chars = s.chars();
    if let (Some(first), Some(last)) = (chars.next(), s.chars().last()) {
        if s.len() > 1 && first == last && quotes.contains(&first) {
            return &s[first.len_utf8()..s.len() - last.len_utf8()];
        }
    }
    s
}

#[cfg(test)]
#[path = "extractors_tests.rs"]
mod extractors_tests;
