// Copyright (c) 2025 - Cowboy AI, Inc.
//! Kubernetes collector
//!
//! Nodes and pods are not listed per pass. Watchers keep local stores
//! current and each pass publishes whatever the stores hold at that moment.
//! A pod whose node has not reached the node store yet is published without
//! its host parent; the next pass fills it in.

pub mod metadata;
pub mod types;
pub mod watch;

use async_trait::async_trait;
use futures::FutureExt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::asset::{AssetType, CloudProvider, Ean};
use crate::config::K8sConfig;
use crate::errors::CollectorResult;
use crate::providers::{skip_item, Emitter};
use crate::scheduler::{CollectionTask, Collector, Shutdown};
use crate::sink::AssetSink;

pub use metadata::{cluster_uid, GceMetadataClient, MetadataFetcher};
pub use types::{KubeNode, KubePod, NodeCloud};
pub use watch::{
    Dispatcher, EventKind, EventStream, KubeEventSource, KubeObject, ResourceEventHandler, Store,
    WatchEvent, WatchedResource, Watcher,
};

/// Stores and handles shared by the pass tasks
pub struct K8sContext {
    pub emitter: Emitter,
    pub nodes: Store<KubeNode>,
    pub pods: Store<KubePod>,
    /// Set when running in-cluster; used for the GKE cluster parent
    pub metadata: Option<Arc<dyn MetadataFetcher>>,
}

impl K8sContext {
    pub fn new(emitter: Emitter) -> Self {
        Self {
            emitter,
            nodes: Store::new(),
            pods: Store::new(),
            metadata: None,
        }
    }
}

/// `cluster:<uid>` when the cluster runs on GKE and the metadata server
/// answers; any failure, cancellation included, leaves nodes without the edge
async fn cluster_parent(ctx: &K8sContext, nodes: &[KubeNode], shutdown: &Shutdown) -> Option<Ean> {
    let fetcher = ctx.metadata.as_ref()?;
    if nodes.first()?.cloud() != NodeCloud::Gce {
        return None;
    }
    match shutdown.guard(fetcher.instance_metadata()).await {
        Ok(doc) => {
            let uid = cluster_uid(&doc);
            if uid.is_none() {
                warn!("metadata document has no cluster-uid attribute");
            }
            uid.map(Ean::cluster)
        }
        Err(e) => {
            warn!(error = %e, "cluster uid lookup failed");
            None
        }
    }
}

/// Publish every node in the node store
pub async fn collect_nodes(ctx: &K8sContext, shutdown: &Shutdown) -> CollectorResult<usize> {
    let nodes = ctx.nodes.list();
    let cluster = cluster_parent(ctx, &nodes, shutdown).await;

    let mut published = 0;
    for node in &nodes {
        let meta = &node.metadata;
        if meta.uid.is_empty() {
            skip_item(AssetType::K8sNode, "uid");
            continue;
        }
        let mut builder = ctx
            .emitter
            .record(AssetType::K8sNode, meta.uid.as_str())
            .maybe_name(Some(meta.name.as_str()))
            .metadata_entry("state", node.state())
            .node_data(meta.name.as_str(), meta.creation_timestamp);
        if let Some(instance_id) = node.cloud_instance_id() {
            builder = builder.cloud_instance_id(instance_id);
        }
        if let Some(cluster) = &cluster {
            builder = builder.parents(vec![cluster.clone()]);
        }
        ctx.emitter.emit(builder).await;
        published += 1;
    }
    Ok(published)
}

/// Publish every pod in the pod store, parented to its node when known
pub async fn collect_pods(ctx: &K8sContext) -> CollectorResult<usize> {
    let mut published = 0;
    for pod in ctx.pods.list() {
        let meta = &pod.metadata;
        if meta.uid.is_empty() {
            skip_item(AssetType::K8sPod, "uid");
            continue;
        }
        let mut builder = ctx
            .emitter
            .record(AssetType::K8sPod, meta.uid.as_str())
            .maybe_name(Some(meta.name.as_str()))
            .pod_data(
                meta.name.as_str(),
                meta.uid.as_str(),
                meta.namespace.as_str(),
                pod.status.start_time,
            );

        let host = ctx
            .nodes
            .get(&pod.spec.node_name)
            .map(|node| node.metadata.uid)
            .filter(|uid| !uid.is_empty());
        match host {
            Some(uid) => builder = builder.parents(vec![Ean::host(uid)]),
            None => debug!(pod = %meta.name, node = %pod.spec.node_name, "node not in store yet"),
        }

        ctx.emitter.emit(builder).await;
        published += 1;
    }
    Ok(published)
}

/// Publish every container of every stored pod that exists in the runtime
pub async fn collect_containers(ctx: &K8sContext) -> CollectorResult<usize> {
    let mut published = 0;
    for pod in ctx.pods.list() {
        let meta = &pod.metadata;
        if meta.uid.is_empty() {
            continue;
        }
        let parent = Ean::container_group(meta.uid.as_str());
        for container in pod.containers() {
            let Some(id) = container.runtime_id() else {
                debug!(pod = %meta.name, container = %container.name, "container not created yet");
                continue;
            };
            let (phase, started_at) = container.state.phase();
            let builder = ctx
                .emitter
                .record(AssetType::K8sContainer, id)
                .maybe_name(Some(container.name.as_str()))
                .container_data(
                    container.name.as_str(),
                    id,
                    meta.namespace.as_str(),
                    phase,
                    started_at,
                )
                .parents(vec![parent.clone()]);
            ctx.emitter.emit(builder).await;
            published += 1;
        }
    }
    Ok(published)
}

pub struct K8sCollector {
    config: K8sConfig,
    source: Arc<dyn KubeEventSource>,
    context: Arc<K8sContext>,
    watchers: Mutex<Vec<Watcher>>,
}

impl K8sCollector {
    pub fn new(config: K8sConfig, source: Arc<dyn KubeEventSource>, sink: Arc<dyn AssetSink>) -> Self {
        let emitter = Emitter::new(sink, config.base.index_namespace.clone());
        Self {
            config,
            source,
            context: Arc::new(K8sContext::new(emitter)),
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Enable the GKE cluster parent lookup
    pub fn with_metadata(mut self, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        if let Some(ctx) = Arc::get_mut(&mut self.context) {
            ctx.metadata = Some(fetcher);
        }
        self
    }

    pub fn context(&self) -> &Arc<K8sContext> {
        &self.context
    }

    /// Watches the enabled types depend on. Pods need the node store for
    /// their parent; containers come from the pod store.
    pub fn watched_resources(&self) -> Vec<WatchedResource> {
        let enabled = |t| self.config.base.is_type_enabled(t);
        let mut resources = Vec::new();
        if enabled(AssetType::K8sNode) || enabled(AssetType::K8sPod) {
            resources.push(WatchedResource::Nodes);
        }
        if enabled(AssetType::K8sPod) || enabled(AssetType::K8sContainer) {
            resources.push(WatchedResource::Pods);
        }
        resources
    }

    pub fn running_watchers(&self) -> usize {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn stop_watchers(&self) {
        let watchers: Vec<Watcher> = self
            .watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for watcher in watchers {
            watcher.stop();
        }
    }
}

#[async_trait]
impl Collector for K8sCollector {
    fn provider(&self) -> CloudProvider {
        CloudProvider::K8s
    }

    fn period(&self) -> Duration {
        self.config.base.period()
    }

    async fn start(&self, shutdown: &Shutdown) -> CollectorResult<()> {
        let dispatcher = Dispatcher::new(
            Arc::new(self.context.nodes.clone()),
            Arc::new(self.context.pods.clone()),
        );
        for resource in self.watched_resources() {
            let started = Watcher::start(
                self.source.as_ref(),
                resource,
                dispatcher.clone(),
                shutdown.clone(),
            )
            .await;
            match started {
                Ok(watcher) => self
                    .watchers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(watcher),
                Err(e) => {
                    self.stop_watchers();
                    return Err(e);
                }
            }
        }
        info!(watchers = self.running_watchers(), "kubernetes watchers running");
        Ok(())
    }

    fn pass(&self, shutdown: &Shutdown) -> Vec<CollectionTask> {
        let mut tasks = Vec::new();
        let base = &self.config.base;
        if base.is_type_enabled(AssetType::K8sNode) {
            let ctx = self.context.clone();
            let shutdown = shutdown.clone();
            tasks.push(CollectionTask::new(
                AssetType::K8sNode,
                "*",
                async move { collect_nodes(&ctx, &shutdown).await }.boxed(),
            ));
        }
        if base.is_type_enabled(AssetType::K8sPod) {
            let ctx = self.context.clone();
            tasks.push(CollectionTask::new(
                AssetType::K8sPod,
                "*",
                async move { collect_pods(&ctx).await }.boxed(),
            ));
        }
        if base.is_type_enabled(AssetType::K8sContainer) {
            let ctx = self.context.clone();
            tasks.push(CollectionTask::new(
                AssetType::K8sContainer,
                "*",
                async move { collect_containers(&ctx).await }.boxed(),
            ));
        }
        tasks
    }

    async fn stop(&self) {
        self.stop_watchers();
    }
}
