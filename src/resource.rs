// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Identity of a watched Kubernetes object.

use std::fmt;

use crate::constants::{KIND_ROUTE_OBJECT, KIND_STANDARD_INGRESS};

/// The two resource kinds the core extracts hostnames from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    StandardIngress,
    RouteObject,
}

impl ResourceKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::StandardIngress => KIND_STANDARD_INGRESS,
            Self::RouteObject => KIND_ROUTE_OBJECT,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identity of a watched object: kind, namespace, name.
///
/// Two objects of different kinds with the same namespace/name are distinct keys —
/// the ledger and event stream never conflate a `StandardIngress` with a `RouteObject`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    #[must_use]
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod resource_tests;
