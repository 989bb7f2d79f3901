// Copyright (c) 2025 - Cowboy AI, Inc.
//! EKS clusters
//!
//! A cluster's children are the EC2 instances of every autoscaling group
//! behind every node group:
//!
//! ```text
//! ListNodegroups → DescribeNodegroup → ASG names
//!   → DescribeAutoScalingGroups → instance ids → host:<id>
//! ```

use futures::future::join_all;
use tracing::warn;

use super::types::{arn_account, EksCluster};
use super::AwsApi;
use crate::asset::{AssetBuilder, AssetType, CloudProvider, Ean};
use crate::errors::CollectorResult;
use crate::providers::{skip_item, Emitter};
use crate::scheduler::Shutdown;

/// Instance ids behind every node group of `cluster`
pub async fn cluster_children(
    api: &dyn AwsApi,
    region: &str,
    cluster: &str,
    shutdown: &Shutdown,
) -> CollectorResult<Vec<Ean>> {
    let nodegroups = shutdown.guard(api.list_nodegroups(region, cluster)).await?;

    let mut asg_names = Vec::new();
    for nodegroup in &nodegroups {
        let described = shutdown
            .guard(api.describe_nodegroup(region, cluster, nodegroup))
            .await?;
        let names = described
            .resources
            .into_iter()
            .flat_map(|r| r.auto_scaling_groups)
            .filter_map(|g| g.name);
        asg_names.extend(names);
    }
    if asg_names.is_empty() {
        return Ok(Vec::new());
    }

    let groups = shutdown
        .guard(api.describe_autoscaling_groups(region, &asg_names))
        .await?;
    Ok(groups
        .into_iter()
        .flat_map(|g| g.instances)
        .filter_map(|i| i.instance_id)
        .map(Ean::host)
        .collect())
}

/// Describe one cluster; `None` when it has no ARN
pub fn describe_cluster(
    emitter: &Emitter,
    region: &str,
    cluster: &EksCluster,
    children: Vec<Ean>,
) -> Option<AssetBuilder> {
    let Some(arn) = cluster.arn.as_deref().filter(|a| !a.is_empty()) else {
        skip_item(AssetType::K8sCluster, "arn");
        return None;
    };

    let parents: Vec<Ean> = cluster
        .resources_vpc_config
        .as_ref()
        .and_then(|c| c.vpc_id.as_deref())
        .filter(|v| !v.is_empty())
        .map(Ean::network)
        .into_iter()
        .collect();

    let mut builder = emitter
        .record(AssetType::K8sCluster, arn)
        .provider(CloudProvider::Aws)
        .region(region)
        .maybe_name(cluster.name.as_deref())
        .parents(parents)
        .children(children)
        .tags(cluster.tags.clone());
    if let Some(account) = arn_account(arn) {
        builder = builder.account(account);
    }
    if let Some(status) = &cluster.status {
        builder = builder.metadata_entry("status", status.as_str());
    }
    Some(builder)
}

async fn describe_with_children(
    api: &dyn AwsApi,
    region: &str,
    name: &str,
    shutdown: &Shutdown,
) -> Option<(EksCluster, Vec<Ean>)> {
    let cluster = match shutdown.guard(api.describe_eks_cluster(region, name)).await {
        Ok(cluster) => cluster,
        Err(e) => {
            warn!(region, cluster = name, error = %e, "skipping EKS cluster");
            return None;
        }
    };
    let children = match cluster_children(api, region, name, shutdown).await {
        Ok(children) => children,
        Err(e) => {
            warn!(region, cluster = name, error = %e, "EKS cluster published without children");
            Vec::new()
        }
    };
    Some((cluster, children))
}

/// Publish every EKS cluster in `region`; clusters are described concurrently
pub async fn collect_clusters(
    api: &dyn AwsApi,
    emitter: &Emitter,
    region: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let names = shutdown.guard(api.list_eks_clusters(region)).await?;
    let described = join_all(
        names
            .iter()
            .map(|name| describe_with_children(api, region, name, shutdown)),
    )
    .await;

    let mut published = 0;
    for (cluster, children) in described.into_iter().flatten() {
        if let Some(builder) = describe_cluster(emitter, region, &cluster, children) {
            emitter.emit(builder).await;
            published += 1;
        }
    }
    Ok(published)
}
