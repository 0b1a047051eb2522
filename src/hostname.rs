// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical DNS hostnames and hostname sets.
//!
//! A [`Hostname`] is always lower-case, ASCII (after punycode normalization of any
//! internationalized label), non-empty, and immutable once built by an extractor.

use std::collections::HashSet;
use std::fmt;

/// A DNS name in canonical lower-case, ASCII form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hostname(String);

impl Hostname {
    /// Parse a raw host string into a canonical [`Hostname`].
    ///
    /// Returns `None` for empty strings, strings with an empty label (e.g. `.zone`),
    /// or labels that cannot be normalized to ASCII.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let (ascii, errors) = idna::domain_to_ascii_cow(trimmed.as_bytes(), idna::AsciiDenyList::URL)
            .map_or_else(
                |_| (trimmed.to_ascii_lowercase(), true),
                |cow| (cow.into_owned(), false),
            );
        if errors {
            // Fall back to plain ASCII lower-casing; reject if it still isn't ASCII.
            if !trimmed.is_ascii() {
                return None;
            }
        }

        let lower = ascii.to_ascii_lowercase();
        if lower.is_empty() || lower.starts_with('.') || lower.ends_with('.') && lower.len() == 1
        {
            return None;
        }
        if lower.split('.').any(str::is_empty) {
            return None;
        }

        Some(Self(lower))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An unordered, duplicate-free collection of [`Hostname`]s.
///
/// Equality is set-equality; iteration order is unspecified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostnameSet(HashSet<Hostname>);

impl HostnameSet {
    #[must_use]
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    pub fn insert(&mut self, host: Hostname) -> bool {
        self.0.insert(host)
    }

    #[must_use]
    pub fn contains(&self, host: &Hostname) -> bool {
        self.0.contains(host)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hostname> {
        self.0.iter()
    }

    /// Hostnames in `self` that are absent from `other`.
    #[must_use]
    pub fn difference<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a Hostname> {
        self.0.difference(&other.0)
    }
}

impl FromIterator<Hostname> for HostnameSet {
    fn from_iter<T: IntoIterator<Item = Hostname>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for HostnameSet {
    type Item = Hostname;
    type IntoIter = std::collections::hash_set::IntoIter<Hostname>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
#[path = "hostname_tests.rs"]
mod hostname_tests;
