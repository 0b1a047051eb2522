// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error taxonomy for DNS backend operations.
//!
//! Mirrors the teacher's split between a typed, retryability-aware internal error
//! and `anyhow::Error` at the binary boundary: backend/reconciler code returns
//! [`BackendError`] so callers can branch on [`BackendError::is_retryable`]; `main.rs`
//! wraps startup failures in `anyhow::Error` for context-chained reporting.

use thiserror::Error;

/// A classified backend failure.
///
/// `Conflict` and `Collision` are not represented here: a conflict is resolved
/// in-place by the remote backend (promote Add to Update) and never escapes as a
/// failure; a collision is a reconciler-level, non-error condition logged directly.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network, TLS, timeout, or transient 5xx — safe to retry.
    #[error("transport error: {message}")]
    Transport { message: String, retryable: bool },

    /// Malformed response, auth rejected, or zone absent — not retryable.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// Filesystem-level failure from the local host-file backend.
    #[error("filesystem error: {message}")]
    Filesystem { message: String, retryable: bool },
}

impl BackendError {
    #[must_use]
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self::Transport {
            message: message.into(),
            retryable,
        }
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn filesystem(message: impl Into<String>, retryable: bool) -> Self {
        Self::Filesystem {
            message: message.into(),
            retryable,
        }
    }

    /// Whether the reconciler may reattempt this call after backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { retryable, .. } | Self::Filesystem { retryable, .. } => *retryable,
            Self::Protocol { .. } => false,
        }
    }

    /// Short machine-stable label for metrics/log fields.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Protocol { .. } => "protocol",
            Self::Filesystem { .. } => "filesystem",
        }
    }
}

/// Classify an HTTP status code per the remote backend's retry policy (§4.4.1):
/// 5xx and 408/429 are retryable; other 4xx are not.
#[must_use]
pub fn is_retryable_http_status(status: u16) -> bool {
    matches!(status, 500..=599 | 408 | 429)
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
