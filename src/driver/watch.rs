// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Watch mode: an initial list-then-watch stream per resource kind.
//!
//! State machine (spec §4.6): `Connecting -> Listing -> Watching`, `Watching` on
//! error falls back to `Backoff -> Connecting`; any state exits to `Stopped` on
//! cancellation.

use std::fmt::Debug;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::runtime::{watcher, watcher::Event};
use kube::{Api, Client, Resource};
use rand::Rng;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{is_cancelled, wait_for_cancel, CancelSignal};
use crate::config::WatchedKinds;
use crate::extractors::{extract_route_object, extract_standard_ingress};
use crate::hostname::HostnameSet;
use crate::reconciler::ReconcilerEvent;
use crate::resource::{ResourceKey, ResourceKind};
use crate::route::RouteObject;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Drives incremental watch streams for every active watched kind.
pub struct WatchDriver {
    client: Client,
    watched_kinds: WatchedKinds,
}

impl WatchDriver {
    #[must_use]
    pub fn new(client: Client, watched_kinds: WatchedKinds) -> Self {
        Self { client, watched_kinds }
    }

    pub async fn run(self, tx: mpsc::Sender<ReconcilerEvent>, cancel: CancelSignal) {
        let mut tasks = Vec::new();

        if self.watched_kinds.contains(ResourceKind::StandardIngress) {
            let client = self.client.clone();
            let tx = tx.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                watch_kind::<Ingress, _>(client, tx, cancel, ResourceKind::StandardIngress, extract_standard_ingress)
                    .await;
            }));
        }

        if self.watched_kinds.contains(ResourceKind::RouteObject) {
            let client = self.client.clone();
            let tx = tx.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                watch_kind::<RouteObject, _>(client, tx, cancel, ResourceKind::RouteObject, extract_route_object)
                    .await;
            }));
        }

        for task in tasks {
            let _ = task.await;
        }
    }
}

/// Watch a single resource kind, reconnecting on failure with jittered backoff and
/// stopping cleanly on cancellation.
async fn watch_kind<K, F>(
    client: Client,
    tx: mpsc::Sender<ReconcilerEvent>,
    cancel: CancelSignal,
    kind: ResourceKind,
    extract: F,
) where
    K: Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned + Send + Sync + 'static,
    F: Fn(&K) -> (ResourceKey, HostnameSet) + Send + Sync + 'static,
{
    let api: Api<K> = Api::all(client);
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if is_cancelled(&cancel) {
            info!(kind = %kind, "watch driver stopped");
            return;
        }

        debug!(kind = %kind, "connecting watch stream");
        let mut stream = watcher(api.clone(), watcher::Config::default()).boxed();
        let mut init_batch: Vec<(ResourceKey, HostnameSet)> = Vec::new();
        let mut known = std::collections::HashSet::new();
        let mut schema_missing_logged = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = wait_for_cancel(&mut cancel.clone()) => {
                    info!(kind = %kind, "watch driver stopped");
                    return;
                }
                next = stream.next() => next,
            };

            let Some(event) = next else {
                warn!(kind = %kind, "watch stream ended, reconnecting");
                break;
            };

            match event {
                Ok(Event::Init) => init_batch.clear(),
                Ok(Event::InitApply(obj)) => {
                    let (key, hosts) = extract(&obj);
                    known.insert(key.clone());
                    init_batch.push((key, hosts));
                }
                Ok(Event::InitDone) => {
                    let batch = std::mem::take(&mut init_batch);
                    if tx.send(ReconcilerEvent::FullList(kind, batch)).await.is_err() {
                        return;
                    }
                }
                Ok(Event::Apply(obj)) => {
                    let (key, hosts) = extract(&obj);
                    let event = if known.insert(key.clone()) {
                        ReconcilerEvent::Added(key, hosts)
                    } else {
                        ReconcilerEvent::Updated(key, hosts)
                    };
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
                Ok(Event::Delete(obj)) => {
                    let (key, _) = extract(&obj);
                    known.remove(&key);
                    if tx.send(ReconcilerEvent::Deleted(key)).await.is_err() {
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
                        error!(kind = %kind, error = %err, "watch stream error, backing off");
                    }
                    break;
                }
            }

            backoff = INITIAL_BACKOFF;
        }

        let jitter = rand::rng().random_range(0.8..=1.2);
        let delay = Duration::from_millis((backoff.as_millis() as f64 * jitter) as u64);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wait_for_cancel(&mut cancel.clone()) => {
                info!(kind = %kind, "watch driver stopped during backoff");
                return;
            }
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Heuristic for "the CRD/resource kind isn't registered in this cluster"
/// (spec §4.6 `SchemaMissing`): the apiserver rejects the list/watch with a 404.
fn is_schema_missing(err: &watcher::Error) -> bool {
    is_schema_missing_message(&err.to_string())
}

fn is_schema_missing_message(message: &str) -> bool {
    message.contains("404") || message.to_ascii_lowercase().contains("not found")
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod watch_tests;
