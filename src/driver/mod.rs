// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Watch/Poll Driver (spec §4.6): produces [`ReconcilerEvent`]s from the cluster
//! onto a bounded channel consumed by the [`crate::reconciler::Reconciler`].

pub mod poll;
pub mod watch;

use kube::Client;
use tokio::sync::{mpsc, watch as watch_channel};

use crate::config::{DriverMode, WatchedKinds};
use crate::reconciler::ReconcilerEvent;

/// Root cancellation signal shared by every driver, timer, and in-flight backend
/// call (spec §5). `true` means "shut down".
pub type CancelSignal = watch_channel::Receiver<bool>;

/// One watched resource kind's extracted producer, keyed by [`crate::resource::ResourceKind`].
pub enum Driver {
    Watch(watch::WatchDriver),
    Poll(poll::PollDriver),
}

impl Driver {
    #[must_use]
    pub fn new(
        mode: DriverMode,
        client: Client,
        watched_kinds: WatchedKinds,
        poll_interval: std::time::Duration,
    ) -> Self {
        match mode {
            DriverMode::Watch => Driver::Watch(watch::WatchDriver::new(client, watched_kinds)),
            DriverMode::Poll => {
                Driver::Poll(poll::PollDriver::new(client, watched_kinds, poll_interval))
            }
        }
    }

    /// Run the driver until `cancel` reports shutdown, forwarding every event onto
    /// `tx`.
    pub async fn run(self, tx: mpsc::Sender<ReconcilerEvent>, cancel: CancelSignal) {
        match self {
            Driver::Watch(d) => d.run(tx, cancel).await,
            Driver::Poll(d) => d.run(tx, cancel).await,
        }
    }
}

/// True once `cancel` has observed a shutdown signal.
pub(crate) fn is_cancelled(cancel: &CancelSignal) -> bool {
    *cancel.borrow()
}

/// Resolve once `cancel` reports shutdown; used inside `tokio::select!` so a
/// sleep, backoff, or blocking wait never outlives the root cancellation
/// signal (spec §5).
pub async fn wait_for_cancel(cancel: &mut CancelSignal) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
