// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The configuration value the core consumes (spec §6.4).
//!
//! Parsing configuration from the environment, a file, or CLI flags is explicitly
//! out of scope (spec §1) — this module only defines the struct an embedder (or
//! `main.rs`) populates. `main.rs` builds one from environment variables the same
//! ad hoc way the teacher builds its own `LeaderElectionConfig`, not through a
//! dedicated parsing crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::resource::ResourceKind;

/// Driver kind (spec §6.4 `mode`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverMode {
    Watch,
    Poll,
}

/// DNS backend selection (spec §6.4 `backend`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

/// Remote (Technitium) backend parameters (spec §6.4 `remote.*`).
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token: String,
    pub tls_verify: bool,
}

/// Local host-file backend parameters (spec §6.4 `local.*`).
#[derive(Clone, Debug)]
pub struct LocalConfig {
    pub hosts_path: PathBuf,
}

/// Which extractors are active (spec §6.4 `watchedKinds`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchedKinds {
    pub standard_ingress: bool,
    pub route_object: bool,
}

impl WatchedKinds {
    #[must_use]
    pub fn all() -> Self {
        Self {
            standard_ingress: true,
            route_object: true,
        }
    }

    #[must_use]
    pub fn contains(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::StandardIngress => self.standard_ingress,
            ResourceKind::RouteObject => self.route_object,
        }
    }
}

/// The full configuration value the reconciliation core consumes.
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: DriverMode,
    pub zone: String,
    pub target_ipv4: String,
    pub ttl_seconds: u32,
    pub backend: BackendKind,
    pub remote: Option<RemoteConfig>,
    pub local: Option<LocalConfig>,
    pub resync_interval: Duration,
    pub poll_interval: Duration,
    pub watched_kinds: WatchedKinds,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
