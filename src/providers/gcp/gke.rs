// Copyright (c) 2025 - Cowboy AI, Inc.
//! GKE clusters
//!
//! Children are the compute instances whose `kube-labels` name one of the
//! cluster's node pools. The instance cache answers when it holds anything;
//! otherwise the instances of the cluster region are listed directly.

use tracing::warn;

use super::compute::summaries;
use super::types::{cluster_parents, zone_filter, GkeCluster};
use super::GcpContext;
use crate::asset::{AssetKind, AssetType, CloudProvider, Ean};
use crate::correlate::{cluster_instance_ids, resolve_link, InstanceSummary};
use crate::errors::{CollectorError, CollectorResult};
use crate::providers::{skip_item, ScopeTally};
use crate::scheduler::Shutdown;

/// Instance ids belonging to `cluster`
pub async fn cluster_children(
    ctx: &GcpContext,
    project: &str,
    region: &str,
    cluster: &GkeCluster,
    shutdown: &Shutdown,
) -> CollectorResult<Vec<String>> {
    let api = ctx.api.clone();
    let filter = zone_filter(region);
    let fallback = || async move {
        let scopes = shutdown
            .guard(api.aggregated_list_instances(project, Some(&filter)))
            .await?;
        Ok::<Vec<InstanceSummary>, CollectorError>(
            scopes
                .iter()
                .flat_map(|s| summaries(project, &s.zone, &s.instances))
                .collect(),
        )
    };
    cluster_instance_ids(&ctx.caches.instances, region, &cluster.node_pool_names(), fallback).await
}

async fn publish_cluster(
    ctx: &GcpContext,
    project: &str,
    cluster: &GkeCluster,
    shutdown: &Shutdown,
) -> bool {
    let Some(id) = cluster.id.as_deref().filter(|id| !id.is_empty()) else {
        skip_item(AssetType::K8sCluster, "id");
        return false;
    };
    let region = cluster.location.clone().unwrap_or_default();

    let parents = cluster
        .network_self_link()
        .and_then(|link| resolve_link(&ctx.caches.vpcs, &link, AssetKind::Network))
        .into_iter()
        .collect();

    let children = match cluster_children(ctx, project, &region, cluster, shutdown).await {
        Ok(ids) => ids.into_iter().map(Ean::host).collect(),
        Err(e) => {
            warn!(cluster = id, error = %e, "GKE cluster published without children");
            Vec::new()
        }
    };

    let mut builder = ctx
        .emitter
        .record(AssetType::K8sCluster, id)
        .provider(CloudProvider::Gcp)
        .region(region)
        .account(project)
        .maybe_name(cluster.name.as_deref())
        .parents(parents)
        .children(children)
        .labels(cluster.resource_labels.clone());
    if let Some(status) = &cluster.status {
        builder = builder.metadata_entry("state", status.as_str());
    }
    ctx.emitter.emit(builder).await;
    true
}

async fn clusters_of(
    ctx: &GcpContext,
    project: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let mut published = 0;
    for parent in cluster_parents(project, &ctx.regions) {
        let clusters = shutdown.guard(ctx.api.list_clusters(&parent)).await?;
        for cluster in &clusters {
            if publish_cluster(ctx, project, cluster, shutdown).await {
                published += 1;
            }
        }
    }
    Ok(published)
}

/// Publish every GKE cluster of every project
pub async fn collect_clusters(ctx: &GcpContext, shutdown: &Shutdown) -> CollectorResult<usize> {
    let mut tally = ScopeTally::default();
    for project in &ctx.projects {
        let outcome = clusters_of(ctx, project, shutdown).await;
        tally.record(project, AssetType::K8sCluster, outcome);
    }
    tally.finish()
}
