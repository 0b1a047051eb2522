// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tunable constants for catalyst-dns-sync.

use std::time::Duration;

/// Default TTL written for every A record when the configuration does not override it.
pub const DEFAULT_TTL_SECONDS: u32 = 300;

/// Default interval between full resyncs, regardless of driver mode.
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Default interval between full lists in poll mode.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default per-request timeout for the remote (Technitium) backend.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default host-file path used by the local backend.
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Sentinel marking the start of the managed block in the host-file.
pub const HOSTS_BLOCK_BEGIN: &str = "# BEGIN CATALYST-DNS-SYNC MANAGED BLOCK";

/// Sentinel marking the end of the managed block in the host-file.
pub const HOSTS_BLOCK_END: &str = "# END CATALYST-DNS-SYNC MANAGED BLOCK";

/// Backoff parameters for backend call retries (§4.5 retry policy).
pub const RETRY_INITIAL_INTERVAL_MILLIS: u64 = 1_000;
pub const RETRY_MAX_INTERVAL_SECS: u64 = 30;
pub const RETRY_MULTIPLIER: f64 = 2.0;
pub const RETRY_MAX_ATTEMPTS: u32 = 4;

/// Interval between heartbeat/lag gauge emissions.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Worker threads for the Tokio runtime.
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Prometheus metrics HTTP server bind address.
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";

/// Prometheus metrics HTTP server port.
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Prometheus metrics HTTP server path.
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Default leader-election lease duration, seconds.
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Default leader-election lease renew deadline, seconds.
pub const DEFAULT_LEASE_RENEW_DEADLINE_SECS: u64 = 10;

/// Default leader-election lease retry period, seconds.
pub const DEFAULT_LEASE_RETRY_PERIOD_SECS: u64 = 2;

/// Label used for the `StandardIngress` resource kind in metrics/logs.
pub const KIND_STANDARD_INGRESS: &str = "StandardIngress";

/// Label used for the `RouteObject` resource kind in metrics/logs.
pub const KIND_ROUTE_OBJECT: &str = "RouteObject";

/// The apex subdomain token the backend expects for a record at the zone itself.
pub const APEX_TOKEN: &str = "@";
