// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The DNS backend abstraction: a common async contract over two interchangeable
//! implementations.

pub mod local_hosts;
pub mod remote;

use async_trait::async_trait;

use crate::errors::BackendError;

/// Whether an `upsert` call created a new record or updated an existing one,
/// so callers can report the right [`crate::metrics::Outcome`] without the
/// backend trait leaking its own internal conflict-handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Shared contract both backend implementations satisfy.
///
/// Every operation is idempotent in intent: `upsert` applied twice with identical
/// arguments has the same observable effect as applying it once; `delete` against an
/// already-absent record returns `Ok`.
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// Create or update an A record `name.zone -> ipv4` with the given TTL.
    async fn upsert(
        &self,
        zone: &str,
        name: &str,
        ipv4: &str,
        ttl: u32,
    ) -> Result<UpsertOutcome, BackendError>;

    /// Remove the A record `name.zone -> ipv4`. Absence is success.
    async fn delete(&self, zone: &str, name: &str, ipv4: &str) -> Result<(), BackendError>;

    /// Lightweight health probe.
    async fn ping(&self) -> Result<(), BackendError>;
}

/// Closed variant set selected by configuration (spec §9: no dynamic dispatch by
/// default — a tagged enum keeps each path monomorphic and directly testable).
pub enum Backend {
    Remote(remote::RemoteBackend),
    LocalHostsFile(local_hosts::LocalHostsFileBackend),
}

#[async_trait]
impl DnsBackend for Backend {
    async fn upsert(
        &self,
        zone: &str,
        name: &str,
        ipv4: &str,
        ttl: u32,
    ) -> Result<UpsertOutcome, BackendError> {
        match self {
            Self::Remote(b) => b.upsert(zone, name, ipv4, ttl).await,
            Self::LocalHostsFile(b) => b.upsert(zone, name, ipv4, ttl).await,
        }
    }

    async fn delete(&self, zone: &str, name: &str, ipv4: &str) -> Result<(), BackendError> {
        match self {
            Self::Remote(b) => b.delete(zone, name, ipv4).await,
            Self::LocalHostsFile(b) => b.delete(zone, name, ipv4).await,
        }
    }

    async fn ping(&self) -> Result<(), BackendError> {
        match self {
            Self::Remote(b) => b.ping().await,
            Self::LocalHostsFile(b) => b.ping().await,
        }
    }
}
