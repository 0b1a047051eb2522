// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Observability hooks (spec §6.5): an abstract [`MetricsSink`] the reconciler and
//! drivers emit through, plus a Prometheus-backed production implementation wired
//! the same way the teacher exposes its own `/metrics` endpoint.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use prometheus::{CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

const METRICS_NAMESPACE: &str = "catalyst_dns_sync";

/// Outcome label for a backend operation counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    Skipped,
    Error,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

/// Kind label for a driver event counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Updated,
    Deleted,
    Resync,
    FullList,
}

impl EventKind {
    fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Resync => "resync",
            Self::FullList => "full_list",
        }
    }
}

/// Abstract counters/gauges/histograms sink (spec §6.5). Implementations MUST be
/// concurrency-safe and infallible — a metrics call never fails a reconciliation.
pub trait MetricsSink: Send + Sync {
    fn record_backend_operation(&self, outcome: Outcome);
    fn record_driver_event(&self, kind: EventKind, resource_kind: &str);
    fn record_collision(&self);
    fn record_backend_latency(&self, operation: &str, duration: Duration);
    fn record_reconciliation_pass(&self, duration: Duration);
    fn set_ledger_size(&self, size: i64);
    fn set_active_resources(&self, resource_kind: &str, count: i64);
    fn mark_successful_reconciliation(&self, unix_timestamp: i64);
}

/// Discards every observation. Used where a sink is required but uninteresting.
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record_backend_operation(&self, _outcome: Outcome) {}
    fn record_driver_event(&self, _kind: EventKind, _resource_kind: &str) {}
    fn record_collision(&self) {}
    fn record_backend_latency(&self, _operation: &str, _duration: Duration) {}
    fn record_reconciliation_pass(&self, _duration: Duration) {}
    fn set_ledger_size(&self, _size: i64) {}
    fn set_active_resources(&self, _resource_kind: &str, _count: i64) {}
    fn mark_successful_reconciliation(&self, _unix_timestamp: i64) {}
}

/// In-memory sink for tests: records only the counters assertions commonly need.
#[derive(Default)]
pub struct RecordingSink {
    pub collisions: AtomicU64,
    pub created: AtomicU64,
    pub updated: AtomicU64,
    pub deleted: AtomicU64,
    pub skipped: AtomicU64,
    pub errors: AtomicU64,
    pub ledger_size: AtomicI64,
    pub last_success_timestamp: AtomicI64,
}

impl MetricsSink for RecordingSink {
    fn record_backend_operation(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Created => &self.created,
            Outcome::Updated => &self.updated,
            Outcome::Deleted => &self.deleted,
            Outcome::Skipped => &self.skipped,
            Outcome::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_driver_event(&self, _kind: EventKind, _resource_kind: &str) {}

    fn record_collision(&self) {
        self.collisions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_backend_latency(&self, _operation: &str, _duration: Duration) {}
    fn record_reconciliation_pass(&self, _duration: Duration) {}

    fn set_ledger_size(&self, size: i64) {
        self.ledger_size.store(size, Ordering::Relaxed);
    }

    fn set_active_resources(&self, _resource_kind: &str, _count: i64) {}

    fn mark_successful_reconciliation(&self, unix_timestamp: i64) {
        self.last_success_timestamp.store(unix_timestamp, Ordering::Relaxed);
    }
}

/// Global Prometheus registry. All metrics below self-register into it.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static BACKEND_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_backend_operations_total"),
        "Total backend operations by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registration");
    counter
});

static DRIVER_EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_driver_events_total"),
        "Total driver events by kind and resource kind",
    );
    let counter = CounterVec::new(opts, &["kind", "resource_kind"]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registration");
    counter
});

static COLLISIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_collisions_total"),
        "Total hostname ownership collisions observed",
    );
    let counter = CounterVec::new(opts, &[]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registration");
    counter
});

static BACKEND_LATENCY_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_backend_operation_latency_seconds"),
        "Backend operation latency in seconds",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registration");
    histogram
});

static RECONCILIATION_PASS_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_pass_duration_seconds"),
        "Duration of one reconciliation pass in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &[]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registration");
    histogram
});

static LEDGER_SIZE: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(format!("{METRICS_NAMESPACE}_ledger_size"), "Current ledger size");
    let gauge = GaugeVec::new(opts, &[]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("metric registration");
    gauge
});

static ACTIVE_RESOURCES: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_active_resources"),
        "Active watched resources per kind",
    );
    let gauge = GaugeVec::new(opts, &["resource_kind"]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("metric registration");
    gauge
});

static LAST_SUCCESS_TIMESTAMP: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_last_success_timestamp_seconds"),
        "Unix timestamp of the last successful reconciliation",
    );
    let gauge = GaugeVec::new(opts, &[]).expect("valid metric labels");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("metric registration");
    gauge
});

/// Production [`MetricsSink`] wired directly into the global Prometheus registry.
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn record_backend_operation(&self, outcome: Outcome) {
        BACKEND_OPERATIONS_TOTAL.with_label_values(&[outcome.label()]).inc();
    }

    fn record_driver_event(&self, kind: EventKind, resource_kind: &str) {
        DRIVER_EVENTS_TOTAL
            .with_label_values(&[kind.label(), resource_kind])
            .inc();
    }

    fn record_collision(&self) {
        COLLISIONS_TOTAL.with_label_values(&[]).inc();
    }

    fn record_backend_latency(&self, operation: &str, duration: Duration) {
        BACKEND_LATENCY_SECONDS
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    fn record_reconciliation_pass(&self, duration: Duration) {
        RECONCILIATION_PASS_SECONDS
            .with_label_values(&[])
            .observe(duration.as_secs_f64());
    }

    fn set_ledger_size(&self, size: i64) {
        LEDGER_SIZE.with_label_values(&[]).set(size as f64);
    }

    fn set_active_resources(&self, resource_kind: &str, count: i64) {
        ACTIVE_RESOURCES
            .with_label_values(&[resource_kind])
            .set(count as f64);
    }

    fn mark_successful_reconciliation(&self, unix_timestamp: i64) {
        LAST_SUCCESS_TIMESTAMP
            .with_label_values(&[])
            .set(unix_timestamp as f64);
    }
}

/// Render the current registry in the Prometheus text exposition format.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let metric_families = METRICS_REGISTRY.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
