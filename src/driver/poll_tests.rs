// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `poll.rs`.

use kube::core::ErrorResponse;

use super::is_schema_missing;

fn api_error(code: u16) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: "the server could not find the requested resource".to_string(),
        reason: "NotFound".to_string(),
        code,
    })
}

#[test]
fn a_404_list_error_is_treated_as_schema_missing() {
    assert!(is_schema_missing(&api_error(404)));
}

#[test]
fn a_403_list_error_is_not_treated_as_schema_missing() {
    assert!(!is_schema_missing(&api_error(403)));
}

#[test]
fn a_500_list_error_is_not_treated_as_schema_missing() {
    assert!(!is_schema_missing(&api_error(500)));
}
