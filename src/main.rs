// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use axum::{routing::get, Router};
use catalyst_dns_sync::backend::local_hosts::{LocalHostsConfig, LocalHostsFileBackend};
use catalyst_dns_sync::backend::remote::{RemoteBackend, RemoteConfig as RemoteBackendConfig};
use catalyst_dns_sync::backend::{Backend, DnsBackend};
use catalyst_dns_sync::config::{
    BackendKind, Config, DriverMode, LocalConfig, RemoteConfig, WatchedKinds,
};
use catalyst_dns_sync::constants::{
    DEFAULT_HOSTS_PATH, DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_RENEW_DEADLINE_SECS,
    DEFAULT_LEASE_RETRY_PERIOD_SECS, DEFAULT_POLL_INTERVAL, DEFAULT_REMOTE_TIMEOUT,
    DEFAULT_RESYNC_INTERVAL, DEFAULT_TTL_SECONDS, HEARTBEAT_INTERVAL, METRICS_SERVER_BIND_ADDRESS,
    METRICS_SERVER_PATH, METRICS_SERVER_PORT, TOKIO_WORKER_THREADS,
};
use catalyst_dns_sync::driver::{poll::PollDriver, wait_for_cancel, CancelSignal, Driver};
use catalyst_dns_sync::ledger::Ledger;
use catalyst_dns_sync::metrics::{self, MetricsSink, PrometheusSink};
use catalyst_dns_sync::reconciler::{Reconciler, ReconcilerConfig, ReconcilerEvent};
use kube::Client;
use kube_lease_manager::LeaseManagerBuilder;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Bounded channel capacity between drivers and the reconciler. Backpressure is
/// tolerable here: the watched resource population is small (spec §9).
const EVENT_CHANNEL_CAPACITY: usize = 256;

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("catalyst-dns-sync")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging, respecting `RUST_LOG` for level selection and
/// `RUST_LOG_FORMAT=json|text` for output format.
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("starting catalyst-dns-sync");
}

/// Build the process configuration from environment variables (spec §1:
/// configuration *parsing* is out of scope for the core; this is the
/// embedder's job, done here the same ad hoc way the teacher derives its own
/// `LeaderElectionConfig`).
fn load_config() -> Result<Config> {
    let mode = match std::env::var("CATALYST_MODE").unwrap_or_else(|_| "watch".to_string()).as_str() {
        "poll" => DriverMode::Poll,
        _ => DriverMode::Watch,
    };

    let zone = std::env::var("CATALYST_ZONE").context("CATALYST_ZONE must be set")?;
    let target_ipv4 =
        std::env::var("CATALYST_TARGET_IPV4").context("CATALYST_TARGET_IPV4 must be set")?;

    let ttl_seconds = std::env::var("CATALYST_TTL_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TTL_SECONDS);

    let backend = match std::env::var("CATALYST_BACKEND").unwrap_or_else(|_| "remote".to_string()).as_str() {
        "local" => BackendKind::Local,
        _ => BackendKind::Remote,
    };

    let remote = (backend == BackendKind::Remote).then(|| {
        let base_url = std::env::var("CATALYST_REMOTE_BASE_URL").unwrap_or_default();
        let token = std::env::var("CATALYST_REMOTE_TOKEN").unwrap_or_default();
        let tls_verify = std::env::var("CATALYST_REMOTE_TLS_VERIFY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);
        RemoteConfig {
            base_url,
            token,
            tls_verify,
        }
    });

    let local = (backend == BackendKind::Local).then(|| {
        let hosts_path = std::env::var("CATALYST_LOCAL_HOSTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_HOSTS_PATH));
        LocalConfig { hosts_path }
    });

    let resync_interval = std::env::var("CATALYST_RESYNC_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RESYNC_INTERVAL);

    let poll_interval = std::env::var("CATALYST_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL);

    let watched_kinds = parse_watched_kinds(&std::env::var("CATALYST_WATCHED_KINDS").unwrap_or_default());

    Ok(Config {
        mode,
        zone,
        target_ipv4,
        ttl_seconds,
        backend,
        remote,
        local,
        resync_interval,
        poll_interval,
        watched_kinds,
    })
}

/// Parse a comma-separated `CATALYST_WATCHED_KINDS` value (`standard-ingress`,
/// `route-object`) into a [`WatchedKinds`]. An empty value watches both kinds.
fn parse_watched_kinds(raw: &str) -> WatchedKinds {
    if raw.trim().is_empty() {
        return WatchedKinds::all();
    }
    let mut kinds = WatchedKinds::default();
    for token in raw.split(',').map(str::trim) {
        match token {
            "standard-ingress" => kinds.standard_ingress = true,
            "route-object" => kinds.route_object = true,
            "" => {}
            other => warn!(kind = other, "ignoring unrecognized watched-kind"),
        }
    }
    kinds
}

/// Build the configured [`Backend`] variant.
async fn build_backend(config: &Config) -> Result<Backend> {
    match config.backend {
        BackendKind::Remote => {
            let remote = config
                .remote
                .clone()
                .context("remote backend selected but remote.* config is missing")?;
            let backend = RemoteBackend::new(RemoteBackendConfig {
                base_url: remote.base_url,
                token: remote.token,
                tls_verify: remote.tls_verify,
                timeout: DEFAULT_REMOTE_TIMEOUT,
            })?;
            Ok(Backend::Remote(backend))
        }
        BackendKind::Local => {
            let local = config
                .local
                .clone()
                .context("local backend selected but local.* config is missing")?;
            let backend = LocalHostsFileBackend::new(LocalHostsConfig {
                hosts_path: local.hosts_path,
            })
            .await?;
            Ok(Backend::LocalHostsFile(backend))
        }
    }
}

/// Serve the Prometheus text exposition format on `/metrics`.
fn start_metrics_server() -> tokio::task::JoinHandle<()> {
    info!(
        bind_address = METRICS_SERVER_BIND_ADDRESS,
        port = METRICS_SERVER_PORT,
        path = METRICS_SERVER_PATH,
        "starting metrics HTTP server"
    );

    tokio::spawn(async move {
        async fn metrics_handler() -> String {
            match metrics::gather_metrics() {
                Ok(text) => text,
                Err(e) => {
                    error!("failed to gather metrics: {e}");
                    String::from("# error gathering metrics\n")
                }
            }
        }

        let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));
        let bind_addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}");
        let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("failed to bind metrics server to {bind_addr}: {e}");
                return;
            }
        };

        info!("metrics server listening on http://{bind_addr}{METRICS_SERVER_PATH}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("metrics server error: {e}");
        }
    })
}

/// Leader-election parameters (spec §1 "exactly one instance of the core is
/// active per DNS zone"), env-derived the same ad hoc way the teacher derives
/// its own `LeaderElectionConfig`.
struct LeaderElectionConfig {
    enabled: bool,
    lease_name: String,
    lease_namespace: String,
    identity: String,
    lease_duration: u64,
    renew_deadline: u64,
    retry_period: u64,
}

fn load_leader_election_config(zone: &str) -> LeaderElectionConfig {
    let enabled = std::env::var("CATALYST_ENABLE_LEADER_ELECTION")
        .unwrap_or_else(|_| "true".to_string())
        .parse::<bool>()
        .unwrap_or(true);

    let lease_name = std::env::var("CATALYST_LEASE_NAME")
        .unwrap_or_else(|_| format!("catalyst-dns-sync-{zone}"));

    let lease_namespace = std::env::var("CATALYST_LEASE_NAMESPACE")
        .or_else(|_| std::env::var("POD_NAMESPACE"))
        .unwrap_or_else(|_| "default".to_string());

    let lease_duration = std::env::var("CATALYST_LEASE_DURATION_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LEASE_DURATION_SECS);
    let renew_deadline = std::env::var("CATALYST_LEASE_RENEW_DEADLINE_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LEASE_RENEW_DEADLINE_SECS);
    let retry_period = std::env::var("CATALYST_LEASE_RETRY_PERIOD_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LEASE_RETRY_PERIOD_SECS);

    let identity = std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("catalyst-dns-sync-{}", rand::random::<u32>()));

    LeaderElectionConfig {
        enabled,
        lease_name,
        lease_namespace,
        identity,
        lease_duration,
        renew_deadline,
        retry_period,
    }
}

/// Periodically refresh the ledger-size gauge, satisfying spec §5's "one
/// timer thread for periodic emission of a lag/heartbeat gauge".
async fn run_heartbeat(ledger: Arc<Ledger>, metrics: Arc<dyn MetricsSink>, mut cancel: CancelSignal) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let size = ledger.len();
                metrics.set_ledger_size(size as i64);
                debug!(ledger_size = size, "heartbeat");
            }
            _ = wait_for_cancel(&mut cancel) => {
                return;
            }
        }
    }
}

/// Run the reconciler, the primary driver, the periodic full-resync driver,
/// and the heartbeat task until `cancel` reports shutdown.
async fn run_reconciliation(
    client: Client,
    config: Config,
    backend: Backend,
    metrics: Arc<dyn MetricsSink>,
    cancel: CancelSignal,
) {
    let ledger = Arc::new(Ledger::new());
    let backend = Arc::new(backend);

    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&ledger),
        Arc::clone(&backend),
        ReconcilerConfig {
            zone: config.zone.clone(),
            target_ipv4: config.target_ipv4.clone(),
            ttl_seconds: config.ttl_seconds,
        },
        Arc::clone(&metrics),
    ));

    let (tx, mut rx) = mpsc::channel::<ReconcilerEvent>(EVENT_CHANNEL_CAPACITY);

    let reconciler_task = {
        let reconciler = Arc::clone(&reconciler);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                reconciler.handle_event(event).await;
            }
        })
    };

    let primary_driver = Driver::new(
        config.mode,
        client.clone(),
        config.watched_kinds.clone(),
        config.poll_interval,
    );
    let primary_task = {
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            primary_driver.run(tx, cancel).await;
        })
    };

    // Periodic full resync: regardless of driver mode (spec §4.5).
    let resync_driver = PollDriver::new(client, config.watched_kinds, config.resync_interval);
    let resync_task = {
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            resync_driver.run(tx, cancel).await;
        })
    };

    let heartbeat_task = tokio::spawn(run_heartbeat(ledger, metrics, cancel.clone()));

    wait_for_cancel(&mut cancel.clone()).await;
    drop(tx);

    let _ = tokio::join!(primary_task, resync_task, heartbeat_task, reconciler_task);
}

/// Wait for a root cancellation signal (SIGINT or SIGTERM) and propagate it.
async fn watch_for_shutdown(cancel_tx: watch::Sender<bool>) {
    let sigterm = async {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    error!("failed to install SIGTERM handler: {e}");
                    std::future::pending::<()>().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT, initiating graceful shutdown");
        }
        () = sigterm => {
            info!("received SIGTERM, initiating graceful shutdown");
        }
    }

    let _ = cancel_tx.send(true);
}

async fn async_main() -> Result<()> {
    initialize_logging();

    let config = load_config()?;
    info!(zone = %config.zone, mode = ?config.mode, backend = ?config.backend, "configuration loaded");

    let kube_config = kube::Config::infer().await.context("failed to load kubeconfig")?;
    let client = Client::try_from(kube_config).context("failed to build Kubernetes client")?;
    let backend = build_backend(&config).await.context("failed to initialize DNS backend")?;
    backend.ping().await.context("initial backend ping failed")?;

    let _metrics_handle = start_metrics_server();
    let metrics: Arc<dyn MetricsSink> = Arc::new(PrometheusSink);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let shutdown_task = tokio::spawn(watch_for_shutdown(cancel_tx));

    let leader_config = load_leader_election_config(&config.zone);
    if leader_config.enabled {
        info!(
            lease_name = %leader_config.lease_name,
            lease_namespace = %leader_config.lease_namespace,
            identity = %leader_config.identity,
            lease_duration_secs = leader_config.lease_duration,
            renew_deadline_secs = leader_config.renew_deadline,
            "leader election enabled, waiting to acquire leadership"
        );

        let lease_manager = LeaseManagerBuilder::new(client.clone(), &leader_config.lease_name)
            .with_namespace(&leader_config.lease_namespace)
            .with_identity(&leader_config.identity)
            .with_duration(leader_config.lease_duration)
            .with_grace(leader_config.retry_period)
            .build()
            .await
            .context("failed to build lease manager")?;

        let (leader_rx, _lease_handle) = lease_manager.watch().await;
        let mut rx = leader_rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                warn!("lease watch channel closed before leadership was acquired");
                return Ok(());
            }
        }
        info!("leadership acquired, starting reconciliation");
    } else {
        warn!("leader election disabled - running without high-availability guarantees");
    }

    run_reconciliation(client, config, backend, metrics, cancel_rx).await;

    shutdown_task.abort();
    info!("shutdown complete");
    Ok(())
}
