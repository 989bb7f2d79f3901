// Copyright (c) 2025 - Cowboy AI, Inc.
//! Kubernetes watchers and local stores
//!
//! An external [`KubeEventSource`] supplies a long-lived stream of watch
//! events per resource. A [`Watcher`] drains one stream on its own task and
//! dispatches each event to the typed [`ResourceEventHandler`] for the
//! object it carries. [`Store`] is the handler the collector reads from.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::types::{KubeNode, KubePod};
use crate::errors::CollectorResult;
use crate::scheduler::Shutdown;

/// Resources the collector watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchedResource {
    Nodes,
    Pods,
}

impl fmt::Display for WatchedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nodes => f.write_str("node"),
            Self::Pods => f.write_str("pod"),
        }
    }
}

/// An object carried by a watch event
#[derive(Debug, Clone, PartialEq)]
pub enum KubeObject {
    Node(KubeNode),
    Pod(KubePod),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    pub kind: EventKind,
    pub object: KubeObject,
}

impl WatchEvent {
    pub fn added(object: KubeObject) -> Self {
        Self {
            kind: EventKind::Added,
            object,
        }
    }

    pub fn updated(object: KubeObject) -> Self {
        Self {
            kind: EventKind::Updated,
            object,
        }
    }

    pub fn deleted(object: KubeObject) -> Self {
        Self {
            kind: EventKind::Deleted,
            object,
        }
    }
}

/// Stream of watch events for one resource
pub type EventStream = BoxStream<'static, CollectorResult<WatchEvent>>;

/// Boundary to the Kubernetes API: list-then-watch streams
#[async_trait]
pub trait KubeEventSource: Send + Sync {
    /// Open a watch; failing here aborts the collector's start
    async fn watch(&self, resource: WatchedResource) -> CollectorResult<EventStream>;
}

/// Typed callbacks for one object type
pub trait ResourceEventHandler<T>: Send + Sync {
    fn on_add(&self, object: T);
    fn on_update(&self, object: T);
    fn on_delete(&self, object: T);
}

/// Objects kept in a [`Store`]
pub trait StoreKey {
    /// Node: name. Pod: namespace/name.
    fn store_key(&self) -> String;
}

impl StoreKey for KubeNode {
    fn store_key(&self) -> String {
        self.metadata.name.clone()
    }
}

impl StoreKey for KubePod {
    fn store_key(&self) -> String {
        format!("{}/{}", self.metadata.namespace, self.metadata.name)
    }
}

/// Latest known state of every watched object
#[derive(Debug)]
pub struct Store<T> {
    objects: Arc<RwLock<BTreeMap<String, T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
        }
    }
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<T: StoreKey + Clone> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot ordered by key
    pub fn list(&self) -> Vec<T> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        objects.values().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        objects.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn upsert(&self, object: T) {
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        objects.insert(object.store_key(), object);
    }

    fn remove(&self, object: &T) {
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        objects.remove(&object.store_key());
    }
}

impl<T> ResourceEventHandler<T> for Store<T>
where
    T: StoreKey + Clone + Send + Sync,
{
    fn on_add(&self, object: T) {
        debug!(key = %object.store_key(), "watcher add");
        self.upsert(object);
    }

    fn on_update(&self, object: T) {
        debug!(key = %object.store_key(), "watcher update");
        self.upsert(object);
    }

    fn on_delete(&self, object: T) {
        debug!(key = %object.store_key(), "watcher delete");
        self.remove(&object);
    }
}

fn route<T>(handler: &dyn ResourceEventHandler<T>, kind: EventKind, object: T) {
    match kind {
        EventKind::Added => handler.on_add(object),
        EventKind::Updated => handler.on_update(object),
        EventKind::Deleted => handler.on_delete(object),
    }
}

/// Routes events to the handler registered for their object type
#[derive(Clone)]
pub struct Dispatcher {
    nodes: Arc<dyn ResourceEventHandler<KubeNode>>,
    pods: Arc<dyn ResourceEventHandler<KubePod>>,
}

impl Dispatcher {
    pub fn new(
        nodes: Arc<dyn ResourceEventHandler<KubeNode>>,
        pods: Arc<dyn ResourceEventHandler<KubePod>>,
    ) -> Self {
        Self { nodes, pods }
    }

    pub fn dispatch(&self, event: WatchEvent) {
        match event.object {
            KubeObject::Node(node) => route(self.nodes.as_ref(), event.kind, node),
            KubeObject::Pod(pod) => route(self.pods.as_ref(), event.kind, pod),
        }
    }
}

/// A running watch; drains its stream until shutdown or [`Watcher::stop`]
#[derive(Debug)]
pub struct Watcher {
    resource: WatchedResource,
    handle: JoinHandle<()>,
}

impl Watcher {
    /// Open the watch and spawn its drain loop
    pub async fn start(
        source: &dyn KubeEventSource,
        resource: WatchedResource,
        dispatcher: Dispatcher,
        shutdown: Shutdown,
    ) -> CollectorResult<Self> {
        let mut events = source.watch(resource).await?;
        info!(resource = %resource, "watcher started");

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    next = events.next() => match next {
                        Some(Ok(event)) => dispatcher.dispatch(event),
                        Some(Err(e)) => warn!(resource = %resource, error = %e, "watch event error"),
                        None => {
                            warn!(resource = %resource, "watch stream ended");
                            break;
                        }
                    },
                }
            }
        });
        Ok(Self { resource, handle })
    }

    pub fn resource(&self) -> WatchedResource {
        self.resource
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        self.handle.abort();
        info!(resource = %self.resource, "watcher stopped");
    }
}
