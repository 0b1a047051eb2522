// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

use crate::errors::{is_retryable_http_status, BackendError};

#[test]
fn transport_error_retryability_is_whatever_the_caller_set() {
    assert!(BackendError::transport("timed out", true).is_retryable());
    assert!(!BackendError::transport("bad request", false).is_retryable());
}

#[test]
fn protocol_error_is_never_retryable() {
    assert!(!BackendError::protocol("malformed response").is_retryable());
}

#[test]
fn filesystem_error_retryability_is_whatever_the_caller_set() {
    assert!(BackendError::filesystem("disk full, try later", true).is_retryable());
    assert!(!BackendError::filesystem("permission denied", false).is_retryable());
}

#[test]
fn kind_label_identifies_the_variant() {
    assert_eq!(BackendError::transport("x", true).kind_label(), "transport");
    assert_eq!(BackendError::protocol("x").kind_label(), "protocol");
    assert_eq!(BackendError::filesystem("x", true).kind_label(), "filesystem");
}

#[test]
fn display_includes_the_message() {
    let err = BackendError::protocol("zone not found");
    assert!(format!("{err}").contains("zone not found"));
}

#[test]
fn is_retryable_http_status_treats_5xx_as_retryable() {
    assert!(is_retryable_http_status(500));
    assert!(is_retryable_http_status(503));
    assert!(is_retryable_http_status(599));
}

#[test]
fn is_retryable_http_status_treats_408_and_429_as_retryable() {
    assert!(is_retryable_http_status(408));
    assert!(is_retryable_http_status(429));
}

#[test]
fn is_retryable_http_status_treats_other_4xx_as_not_retryable() {
    assert!(!is_retryable_http_status(400));
    assert!(!is_retryable_http_status(401));
    assert!(!is_retryable_http_status(404));
}
