// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The reconciler: consumes driver events, diffs them against the ledger, and
//! issues the resulting backend deltas.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::backend::{Backend, DnsBackend, UpsertOutcome};
use crate::hostname::{Hostname, HostnameSet};
use crate::ledger::{ClaimOutcome, Ledger};
use crate::metrics::{EventKind, MetricsSink, Outcome};
use crate::resource::{ResourceKey, ResourceKind};
use crate::retry::retry_backend_call;

/// One fact delivered by a Driver (spec §4.5).
#[derive(Clone, Debug)]
pub enum ReconcilerEvent {
    Added(ResourceKey, HostnameSet),
    Updated(ResourceKey, HostnameSet),
    Deleted(ResourceKey),
    Resync(ResourceKey, HostnameSet),
    /// A full list of every currently-existing resource of `kind`, authoritative
    /// over that kind's slice of the ledger only — a per-kind list must never
    /// tear down another kind's records (spec §4.5/§4.6: each watched kind
    /// drives its own independent snapshot).
    FullList(ResourceKind, Vec<(ResourceKey, HostnameSet)>),
}

/// Fixed process-wide parameters the reconciler needs beyond the event stream
/// (spec §6.4 `zone`, `targetIPv4`, `ttlSeconds`).
#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    pub zone: String,
    pub target_ipv4: String,
    pub ttl_seconds: u32,
}

/// Drives the event-handling algorithm of spec §4.5.
///
/// A single instance is the only writer to its [`Ledger`]; callers should feed
/// events from a single consumer task so that events for the same [`ResourceKey`]
/// are processed in the order received, per spec §5's ordering guarantee.
pub struct Reconciler {
    ledger: Arc<Ledger>,
    backend: Arc<Backend>,
    config: ReconcilerConfig,
    metrics: Arc<dyn MetricsSink>,
    /// Resources currently known to exist per kind, used only to drive the
    /// `active_resources` gauge — distinct from the `Ledger`, which tracks
    /// hostname ownership, not resource existence.
    active_resources: StdMutex<HashMap<ResourceKind, HashSet<ResourceKey>>>,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        ledger: Arc<Ledger>,
        backend: Arc<Backend>,
        config: ReconcilerConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            ledger,
            backend,
            config,
            metrics,
            active_resources: StdMutex::new(HashMap::new()),
        }
    }

    fn note_resource_active(&self, key: &ResourceKey) {
        let mut map = self.active_resources.lock().expect("active_resources lock poisoned");
        let set = map.entry(key.kind).or_default();
        set.insert(key.clone());
        let count = set.len() as i64;
        self.metrics.set_active_resources(key.kind.label(), count);
    }

    fn note_resource_removed(&self, key: &ResourceKey) {
        let mut map = self.active_resources.lock().expect("active_resources lock poisoned");
        let set = map.entry(key.kind).or_default();
        set.remove(key);
        let count = set.len() as i64;
        self.metrics.set_active_resources(key.kind.label(), count);
    }

    fn replace_active_resources(&self, kind: ResourceKind, keys: impl Iterator<Item = ResourceKey>) {
        let mut map = self.active_resources.lock().expect("active_resources lock poisoned");
        let set: HashSet<ResourceKey> = keys.collect();
        let count = set.len() as i64;
        map.insert(kind, set);
        self.metrics.set_active_resources(kind.label(), count);
    }

    /// Dispatch one event through the appropriate algorithm branch.
    pub async fn handle_event(&self, event: ReconcilerEvent) {
        let start = Instant::now();
        match event {
            ReconcilerEvent::Added(key, hosts) => {
                self.metrics.record_driver_event(EventKind::Added, key.kind.label());
                self.reconcile_owned_set(&key, &hosts).await;
            }
            ReconcilerEvent::Updated(key, hosts) => {
                self.metrics.record_driver_event(EventKind::Updated, key.kind.label());
                self.reconcile_owned_set(&key, &hosts).await;
            }
            ReconcilerEvent::Resync(key, hosts) => {
                self.metrics.record_driver_event(EventKind::Resync, key.kind.label());
                self.reconcile_owned_set(&key, &hosts).await;
            }
            ReconcilerEvent::Deleted(key) => {
                self.metrics.record_driver_event(EventKind::Deleted, key.kind.label());
                self.reconcile_deleted(&key).await;
            }
            ReconcilerEvent::FullList(kind, entries) => {
                self.metrics.record_driver_event(EventKind::FullList, kind.label());
                self.reconcile_full_list(kind, entries).await;
            }
        }
        self.metrics.set_ledger_size(self.ledger.len() as i64);
        self.metrics.record_reconciliation_pass(start.elapsed());
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.metrics.mark_successful_reconciliation(now);
    }

    fn in_zone_set(&self, hosts: &HostnameSet) -> HostnameSet {
        hosts
            .iter()
            .filter(|h| crate::zone::in_zone(h, &self.config.zone))
            .cloned()
            .collect()
    }

    async fn upsert_host(&self, host: &Hostname) -> bool {
        let name = crate::zone::subdomain(host, &self.config.zone);
        let zone = self.config.zone.clone();
        let ip = self.config.target_ipv4.clone();
        let ttl = self.config.ttl_seconds;
        let backend = Arc::clone(&self.backend);

        let start = Instant::now();
        let result = retry_backend_call("upsert", || {
            let backend = Arc::clone(&backend);
            let zone = zone.clone();
            let name = name.clone();
            let ip = ip.clone();
            async move { backend.upsert(&zone, &name, &ip, ttl).await }
        })
        .await;
        self.metrics.record_backend_latency("upsert", start.elapsed());

        match result {
            Ok(UpsertOutcome::Created) => {
                self.metrics.record_backend_operation(Outcome::Created);
                true
            }
            Ok(UpsertOutcome::Updated) => {
                self.metrics.record_backend_operation(Outcome::Updated);
                true
            }
            Err(err) => {
                warn!(host = %host, error = %err, "upsert failed, releasing speculative claim");
                self.metrics.record_backend_operation(Outcome::Error);
                false
            }
        }
    }

    async fn delete_host(&self, host: &Hostname) -> bool {
        let name = crate::zone::subdomain(host, &self.config.zone);
        let zone = self.config.zone.clone();
        let ip = self.config.target_ipv4.clone();
        let backend = Arc::clone(&self.backend);

        let start = Instant::now();
        let result = retry_backend_call("delete", || {
            let backend = Arc::clone(&backend);
            let zone = zone.clone();
            let name = name.clone();
            let ip = ip.clone();
            async move { backend.delete(&zone, &name, &ip).await }
        })
        .await;
        self.metrics.record_backend_latency("delete", start.elapsed());

        match result {
            Ok(()) => {
                self.metrics.record_backend_operation(Outcome::Deleted);
                true
            }
            Err(err) => {
                warn!(host = %host, error = %err, "delete failed, keeping claim for next resync");
                self.metrics.record_backend_operation(Outcome::Error);
                false
            }
        }
    }

    /// Handle Added/Updated/Resync (spec §4.5 shared algorithm).
    async fn reconcile_owned_set(&self, key: &ResourceKey, hosts: &HostnameSet) {
        self.note_resource_active(key);
        let new = self.in_zone_set(hosts);
        let owned: HostnameSet = self.ledger.owned_by(key).into_iter().collect();

        for host in new.difference(&owned) {
            match self.ledger.claim(host, key) {
                ClaimOutcome::Granted => {
                    if !self.upsert_host(host).await {
                        self.ledger.release(host, key);
                    }
                }
                ClaimOutcome::AlreadyOwnedBy(other) => {
                    warn!(host = %host, owner = %other, claimant = %key, "collision: hostname already owned");
                    self.metrics.record_collision();
                    self.metrics.record_backend_operation(Outcome::Skipped);
                }
            }
        }

        for host in owned.difference(&new) {
            if self.delete_host(host).await {
                self.ledger.release(host, key);
            }
        }
    }

    /// Handle Deleted (spec §4.5).
    async fn reconcile_deleted(&self, key: &ResourceKey) {
        for host in self.ledger.owned_by(key) {
            if self.delete_host(&host).await {
                self.ledger.release(&host, key);
            }
        }
        self.note_resource_removed(key);
        info!(resource = %key, "resource deleted, owned records released");
    }

    /// Handle FullList (spec §4.5): build the desired mapping after zone filtering,
    /// first-writer-wins on duplicate hostnames across resources.
    ///
    /// `kind` is authoritative only over its own slice of the ledger — deletion
    /// never touches a hostname owned by a resource of a different kind, since
    /// each watched kind's driver produces its own independent, kind-scoped
    /// snapshot (spec §4.5/§4.6).
    async fn reconcile_full_list(&self, kind: ResourceKind, entries: Vec<(ResourceKey, HostnameSet)>) {
        self.replace_active_resources(kind, entries.iter().map(|(key, _)| key.clone()));

        let mut desired: HashMap<Hostname, ResourceKey> = HashMap::new();
        for (key, hosts) in &entries {
            for host in self.in_zone_set(hosts).into_iter() {
                desired.entry(host).or_insert_with(|| key.clone());
            }
        }

        for (host, owner) in &desired {
            match self.ledger.owner_of(host) {
                None => {
                    if let ClaimOutcome::Granted = self.ledger.claim(host, owner) {
                        if !self.upsert_host(host).await {
                            self.ledger.release(host, owner);
                        }
                    }
                }
                Some(current) if &current == owner => {
                    debug!(host = %host, owner = %owner, "full list no-op, already owned");
                }
                Some(current) => {
                    warn!(host = %host, owner = %current, claimant = %owner, "collision during full list");
                    self.metrics.record_collision();
                    self.metrics.record_backend_operation(Outcome::Skipped);
                }
            }
        }

        for (host, owner) in self.ledger.snapshot() {
            if owner.kind == kind && !desired.contains_key(&host) && self.delete_host(&host).await {
                self.ledger.release(&host, &owner);
            }
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
