// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # catalyst-dns-sync
//!
//! A Kubernetes-to-DNS reconciliation daemon: it watches ingress-shaped
//! workload resources, extracts the external hostnames they declare, and
//! maintains a corresponding set of authoritative DNS A records in an
//! upstream Technitium DNS server (or, in local mode, an idempotent managed
//! block of the operator's own host-file).
//!
//! ## Modules
//!
//! - [`hostname`] - canonical DNS hostnames and hostname sets
//! - [`resource`] - stable identity of a watched Kubernetes object
//! - [`route`] - minimal route-object shape (the Traefik-style custom resource)
//! - [`extractors`] - pure `(object) -> (ResourceKey, HostnameSet)` functions
//! - [`zone`] - the zone-membership admission filter
//! - [`ledger`] - the ownership ledger
//! - [`backend`] - the DNS backend abstraction (remote Technitium / local hosts-file)
//! - [`retry`] - the shared backoff combinator every backend call goes through
//! - [`reconciler`] - the event-driven reconciliation algorithm
//! - [`driver`] - the watch/poll drivers that feed the reconciler
//! - [`config`] - the configuration value the core consumes
//! - [`metrics`] - the abstract metrics sink and its Prometheus implementation
//! - [`errors`] - the backend error taxonomy
//! - [`constants`] - tunable defaults

pub mod backend;
pub mod config;
pub mod constants;
pub mod driver;
pub mod errors;
pub mod extractors;
pub mod hostname;
pub mod ledger;
pub mod metrics;
pub mod reconciler;
pub mod resource;
pub mod retry;
pub mod route;
pub mod zone;
