// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Local host-file DNS backend: maintains an idempotent managed block inside a
//! text host-file instead of talking to a remote DNS server.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{DnsBackend, UpsertOutcome};
use crate::constants::{APEX_TOKEN, HOSTS_BLOCK_BEGIN, HOSTS_BLOCK_END};
use crate::errors::BackendError;

/// Rejoin the zone-relative `name` the reconciler derives via
/// [`crate::zone::subdomain`] back into the full hostname a host-file entry
/// must carry (spec §6.3: body lines are `IPV4  HOSTNAME`, not the bare
/// zone-relative label Technitium's API expects).
fn full_hostname(zone: &str, name: &str) -> String {
    if name == APEX_TOKEN {
        zone.to_string()
    } else {
        format!("{name}.{zone}")
    }
}

/// Configuration for the [`LocalHostsFileBackend`] (spec §6.4 `local.*`).
#[derive(Clone, Debug)]
pub struct LocalHostsConfig {
    pub hosts_path: PathBuf,
}

/// Rewrites a managed region of a host-file to reflect the claimed hostname set.
///
/// All mutating calls are serialized through an internal async mutex so only one
/// atomic rewrite is ever in flight (§4.4.2).
pub struct LocalHostsFileBackend {
    config: LocalHostsConfig,
    /// In-memory model of the managed region: hostname -> ipv4.
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalHostsFileBackend {
    /// Build a backend for `config`, seeding the in-memory model from whatever
    /// managed block is already present on disk (if any).
    pub async fn new(config: LocalHostsConfig) -> Result<Self, BackendError> {
        let entries = read_managed_entries(&config.hosts_path).await?;
        Ok(Self {
            config,
            entries: Mutex::new(entries),
        })
    }

    async fn rewrite(&self, entries: &BTreeMap<String, String>) -> Result<(), BackendError> {
        rewrite_hosts_file(&self.config.hosts_path, entries).await
    }
}

#[async_trait]
impl DnsBackend for LocalHostsFileBackend {
    async fn upsert(
        &self,
        zone: &str,
        name: &str,
        ipv4: &str,
        _ttl: u32,
    ) -> Result<UpsertOutcome, BackendError> {
        let host = full_hostname(zone, name);
        let mut entries = self.entries.lock().await;
        let existed = entries.insert(host.clone(), ipv4.to_string()).is_some();
        debug!(host, ipv4, "host-file entry upserted");
        self.rewrite(&entries).await?;
        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    async fn delete(&self, zone: &str, name: &str, _ipv4: &str) -> Result<(), BackendError> {
        let host = full_hostname(zone, name);
        let mut entries = self.entries.lock().await;
        if entries.remove(&host).is_none() {
            debug!(host, "host-file entry already absent, treating delete as success");
            return Ok(());
        }
        info!(host, "host-file entry deleted");
        self.rewrite(&entries).await
    }

    async fn ping(&self) -> Result<(), BackendError> {
        tokio::fs::metadata(&self.config.hosts_path)
            .await
            .map(|_| ())
            .or_else(|e| {
                if e.kind() == ErrorKind::NotFound {
                    Ok(())
                } else {
                    Err(BackendError::filesystem(e.to_string(), false))
                }
            })
    }
}

/// Read the existing host-file (if any) and parse its managed block's entries.
async fn read_managed_entries(path: &Path) -> Result<BTreeMap<String, String>, BackendError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(classify_io_error(&e)),
    };

    let mut entries = BTreeMap::new();
    let mut inside = false;
    for line in content.lines() {
        if line == HOSTS_BLOCK_BEGIN {
            inside = true;
            continue;
        }
        if line == HOSTS_BLOCK_END {
            break;
        }
        if inside && !line.starts_with('#') {
            let mut parts = line.split_whitespace();
            if let (Some(ip), Some(host)) = (parts.next(), parts.next()) {
                entries.insert(host.to_string(), ip.to_string());
            }
        }
    }
    Ok(entries)
}

/// Atomically rewrite `path`'s managed block to reflect `entries`, preserving every
/// byte outside the block and collapsing multiple stray blocks to one.
async fn rewrite_hosts_file(
    path: &Path,
    entries: &BTreeMap<String, String>,
) -> Result<(), BackendError> {
    let original = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(classify_io_error(&e)),
    };

    let rendered = render_block(entries);
    let new_content = splice_managed_block(&original, &rendered);

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| BackendError::filesystem(format!("failed to create temp file: {e}"), true))?;
    {
        use std::io::Write;
        tmp.write_all(new_content.as_bytes())
            .map_err(|e| BackendError::filesystem(format!("failed to write temp file: {e}"), true))?;
    }
    tmp.persist(path).map_err(|e| classify_io_error(&e.error))?;
    Ok(())
}

/// Render the managed block body: one `ipv4  hostname` line per entry, sorted by
/// hostname, with a leading identifying comment and a trailing entry count.
fn render_block(entries: &BTreeMap<String, String>) -> String {
    let mut body = String::new();
    body.push_str(HOSTS_BLOCK_BEGIN);
    body.push('\n');
    if entries.is_empty() {
        body.push_str("# (no managed records)\n");
    } else {
        for (host, ip) in entries {
            body.push_str(ip);
            body.push_str("  ");
            body.push_str(host);
            body.push('\n');
        }
    }
    body.push_str(&format!("# {} managed entries\n", entries.len()));
    body.push_str(HOSTS_BLOCK_END);
    body.push('\n');
    body
}

/// Replace the (first, if several) existing managed block in `original` with
/// `rendered`, or append `rendered` if no block is present. Any text outside the
/// first matched block, and any further stray blocks, are dropped from the
/// replaced region but everything else is preserved byte-for-byte.
fn splice_managed_block(original: &str, rendered: &str) -> String {
    let begin = original.find(HOSTS_BLOCK_BEGIN);
    let Some(begin_idx) = begin else {
        let mut out = original.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(rendered);
        return out;
    };

    // Find the last END marker so repeated/stray blocks collapse to one.
    let end_marker_idx = original.rfind(HOSTS_BLOCK_END);
    let after = match end_marker_idx {
        Some(idx) if idx >= begin_idx => {
            let tail_start = idx + HOSTS_BLOCK_END.len();
            original[tail_start..].trim_start_matches('\n').to_string()
        }
        _ => String::new(),
    };

    let mut out = original[..begin_idx].to_string();
    out.push_str(rendered);
    if !after.is_empty() {
        out.push_str(&after);
    }
    out
}

fn classify_io_error(e: &std::io::Error) -> BackendError {
    match e.kind() {
        ErrorKind::PermissionDenied => BackendError::filesystem(e.to_string(), false),
        ErrorKind::OutOfMemory => BackendError::filesystem(e.to_string(), false),
        _ => BackendError::filesystem(e.to_string(), true),
    }
}

#[cfg(test)]
#[path = "local_hosts_tests.rs"]
mod local_hosts_tests;
