// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The zone filter: the single admission gate between an extracted hostname and
//! the ledger/backend.

use crate::constants::APEX_TOKEN;
use crate::hostname::Hostname;

/// True iff `host` equals `zone` or is a dot-suffixed subdomain of it.
///
/// `zone` is expected to already be in canonical lower-case form; this function does
/// not itself lower-case it, matching the teacher's convention of canonicalizing at
/// the boundary (extraction) rather than at every comparison site.
#[must_use]
pub fn in_zone(host: &Hostname, zone: &str) -> bool {
    let host = host.as_str();
    host == zone || host.ends_with(format!(".{zone}").as_str())
}

/// The backend-facing subdomain label for an in-zone hostname.
///
/// Returns [`APEX_TOKEN`] when `host` equals `zone` exactly; otherwise the host with
/// the `.zone` suffix stripped. Callers must check [`in_zone`] first — this function
/// does not re-validate zone membership.
#[must_use]
pub fn subdomain(host: &Hostname, zone: &str) -> String {
    let host = host.as_str();
    if host == zone {
        APEX_TOKEN.to_string()
    } else {
        host.strip_suffix(format!(".{zone}").as_str())
            .unwrap_or(host)
            .to_string()
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
