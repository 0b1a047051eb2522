// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Minimal route-object shape.
//!
//! Modeled on Traefik's `IngressRoute` CRD (`traefik.io/v1alpha1`): a list of routes,
//! each carrying a `match` expression string such as `` Host(`a.example.com`) `` or
//! `` Host(`a.example.com`) || Host(`b.example.com`) ``. Only the fields the
//! extractor reads are represented; the rest of the upstream schema is ignored.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One route entry within a [`RouteObjectSpec`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct RouteEntry {
    /// The routing-rule kind, e.g. `"Rule"`. Carried through but not interpreted.
    #[serde(default)]
    pub kind: String,
    /// The match expression, e.g. `` Host(`a.example.com`) ``.
    #[serde(rename = "match")]
    pub match_expr: String,
}

/// Spec of a route object: a list of [`RouteEntry`] values.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, CustomResource)]
#[kube(
    group = "catalyst-dns-sync.firestoned.io",
    version = "v1alpha1",
    kind = "RouteObject",
    namespaced
)]
pub struct RouteObjectSpec {
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod route_tests;
