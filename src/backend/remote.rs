// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Remote DNS backend: an HTTP client for the Technitium DNS Server management API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::{DnsBackend, UpsertOutcome};
use crate::errors::{is_retryable_http_status, BackendError};

/// Connection parameters for the [`RemoteBackend`] (spec §6.4 `remote.*`).
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token: String,
    pub tls_verify: bool,
    pub timeout: Duration,
}

/// HTTP client talking to Technitium's record management endpoints.
///
/// Every call is a single form-encoded POST; retry is the caller's responsibility
/// (§4.4, §4.6) — this backend never loops internally.
pub struct RemoteBackend {
    client: reqwest::Client,
    config: RemoteConfig,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

impl RemoteBackend {
    /// Build a backend from `config`. Logs a warning once at startup if TLS
    /// verification is disabled.
    pub fn new(config: RemoteConfig) -> Result<Self, BackendError> {
        if !config.tls_verify {
            warn!("remote backend starting with TLS verification disabled");
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.tls_verify)
            .build()
            .map_err(|e| BackendError::protocol(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/{path}")
    }

    async fn call(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse, BackendError> {
        let mut full_params: Vec<(&str, &str)> = vec![("token", self.config.token.as_str())];
        full_params.extend_from_slice(params);

        let response = self
            .client
            .post(self.endpoint(path))
            .form(&full_params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    BackendError::transport(e.to_string(), true)
                } else {
                    BackendError::transport(e.to_string(), false)
                }
            })?;

        let status = response.status();
        if status.as_u16() >= 500 {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, path, "remote backend server error: {body}");
            return Err(BackendError::transport(
                format!("server error {status}: {body}"),
                true,
            ));
        }
        if !status.is_success() {
            let retryable = is_retryable_http_status(status.as_u16());
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, path, retryable, "remote backend non-success status: {body}");
            return Err(BackendError::transport(
                format!("http status {status}: {body}"),
                retryable,
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::protocol(format!("failed to read response body: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| BackendError::protocol(format!("malformed response body: {e} ({text})")))
    }
}

#[async_trait]
impl DnsBackend for RemoteBackend {
    async fn upsert(
        &self,
        zone: &str,
        name: &str,
        ipv4: &str,
        ttl: u32,
    ) -> Result<UpsertOutcome, BackendError> {
        let ttl_str = ttl.to_string();
        let params = [
            ("zone", zone),
            ("type", "A"),
            ("domain", name),
            ("ipAddress", ipv4),
            ("ttl", ttl_str.as_str()),
        ];

        debug!(zone, name, ipv4, ttl, "upserting A record");
        let resp = self.call("api/zones/records/add", &params).await?;
        if resp.status == "ok" {
            info!(zone, name, "A record created");
            return Ok(UpsertOutcome::Created);
        }

        let message = resp.error_message.unwrap_or_default();
        if message.to_ascii_lowercase().contains("already exist") {
            debug!(zone, name, "record exists, promoting to update");
            let update = self.call("api/zones/records/update", &params).await?;
            if update.status == "ok" {
                info!(zone, name, "A record updated");
                return Ok(UpsertOutcome::Updated);
            }
            let update_message = update.error_message.unwrap_or_default();
            return Err(BackendError::protocol(format!(
                "update after conflict failed: {update_message}"
            )));
        }

        Err(BackendError::protocol(format!("add record failed: {message}")))
    }

    async fn delete(&self, zone: &str, name: &str, ipv4: &str) -> Result<(), BackendError> {
        let params = [("zone", zone), ("type", "A"), ("domain", name), ("ipAddress", ipv4)];

        debug!(zone, name, ipv4, "deleting A record");
        let resp = self.call("api/zones/records/delete", &params).await?;
        if resp.status == "ok" {
            info!(zone, name, "A record deleted");
            return Ok(());
        }

        let message = resp.error_message.unwrap_or_default();
        if message.to_ascii_lowercase().contains("not found") {
            debug!(zone, name, "record already absent, treating delete as success");
            return Ok(());
        }

        Err(BackendError::protocol(format!("delete record failed: {message}")))
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.call("api/user/session/get", &[]).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod remote_tests;
