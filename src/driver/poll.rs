// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Poll mode: periodically lists every resource of each active kind and
//! dispatches the full set as authoritative (spec §4.6).

use std::fmt::Debug;
use std::time::Duration;

use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::{is_cancelled, wait_for_cancel, CancelSignal};
use crate::config::WatchedKinds;
use crate::extractors::{extract_route_object, extract_standard_ingress};
use crate::hostname::HostnameSet;
use crate::reconciler::ReconcilerEvent;
use crate::resource::{ResourceKey, ResourceKind};
use crate::route::RouteObject;

/// Drives a periodic full-list for every active watched kind.
///
/// No incremental events are ever produced in this mode; each tick yields one
/// [`ReconcilerEvent::FullList`] per kind, treated as authoritative (spec §4.6).
pub struct PollDriver {
    client: Client,
    watched_kinds: WatchedKinds,
    interval: Duration,
}

impl PollDriver {
    #[must_use]
    pub fn new(client: Client, watched_kinds: WatchedKinds, interval: Duration) -> Self {
        Self {
            client,
            watched_kinds,
            interval,
        }
    }

    pub async fn run(self, tx: mpsc::Sender<ReconcilerEvent>, cancel: CancelSignal) {
        let mut tasks = Vec::new();

        if self.watched_kinds.contains(ResourceKind::StandardIngress) {
            let client = self.client.clone();
            let tx = tx.clone();
            let cancel = cancel.clone();
            let interval = self.interval;
            tasks.push(tokio::spawn(async move {
                poll_kind::<k8s_openapi::api::networking::v1::Ingress, _>(
                    client,
                    tx,
                    cancel,
                    interval,
                    ResourceKind::StandardIngress,
                    extract_standard_ingress,
                )
                .await;
            }));
        }

        if self.watched_kinds.contains(ResourceKind::RouteObject) {
            let client = self.client.clone();
            let tx = tx.clone();
            let cancel = cancel.clone();
            let interval = self.interval;
            tasks.push(tokio::spawn(async move {
                poll_kind::<RouteObject, _>(
                    client,
                    tx,
                    cancel,
                    interval,
                    ResourceKind::RouteObject,
                    extract_route_object,
                )
                .await;
            }));
        }

        for task in tasks {
            let _ = task.await;
        }
    }
}

/// List `K` every `interval` and forward a `FullList` until cancelled.
///
/// A list failure is logged and retried on the next tick rather than
/// terminating the loop — a transient apiserver hiccup should not park this
/// kind's pipeline the way a genuinely missing schema does (spec §4.6
/// `SchemaMissing`).
async fn poll_kind<K, F>(
    client: Client,
    tx: mpsc::Sender<ReconcilerEvent>,
    mut cancel: CancelSignal,
    interval: Duration,
    kind: ResourceKind,
    extract: F,
) where
    K: Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned + Send + Sync + 'static,
    F: Fn(&K) -> (ResourceKey, HostnameSet) + Send + Sync + 'static,
{
    let api: Api<K> = Api::all(client);
    let mut schema_missing_logged = false;

    loop {
        if is_cancelled(&cancel) {
            return;
        }

        match api.list(&Default::default()).await {
            Ok(list) => {
                schema_missing_logged = false;
                let batch: Vec<(ResourceKey, HostnameSet)> = list.items.iter().map(&extract).collect();
                debug!(kind = %kind, count = batch.len(), "poll list succeeded");
                if tx.send(ReconcilerEvent::FullList(kind, batch)).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                if is_schema_missing(&err) {
                    if !schema_missing_logged {
                        warn!(kind = %kind, "resource schema not registered, idling this pipeline");
                        schema_missing_logged = true;
                    }
                } else {
                    error!(kind = %kind, error = %err, "poll list failed, retrying next interval");
                }
            }
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = wait_for_cancel(&mut cancel) => {
                return;
            }
        }
    }
}

/// Mirrors [`super::watch::is_schema_missing`]'s heuristic for the list API's
/// error type.
fn is_schema_missing(err: &kube::Error) -> bool {
    match err {
        kube::Error::Api(resp) => resp.code == 404,
        _ => false,
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod poll_tests;
