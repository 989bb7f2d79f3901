// Copyright (c) 2025 - Cowboy AI, Inc.
//! Snapshot provider source
//!
//! Implements every provider API trait over raw listings saved as JSON, so
//! the collector runs end to end without cloud credentials. Layout:
//!
//! ```text
//! <root>/aws/<region>/instances.json           [Reservation]
//! <root>/aws/<region>/vpcs.json                [Vpc]
//! <root>/aws/<region>/subnets.json             [Subnet]
//! <root>/aws/<region>/eks_clusters.json        [EksCluster]
//! <root>/aws/<region>/nodegroups.json          {cluster: [Nodegroup]}
//! <root>/aws/<region>/autoscaling_groups.json  [AutoScalingGroup]
//! <root>/gcp/<project>/networks.json           [Network]
//! <root>/gcp/<project>/subnetworks.json        [Subnetwork]
//! <root>/gcp/<project>/instances.json          [ZoneInstances]
//! <root>/gcp/<project>/clusters.json           [GkeCluster]
//! <root>/azure/subscriptions.json              [String]
//! <root>/azure/<subscription>/vms.json         [VirtualMachine]
//! <root>/k8s/nodes.json                        [KubeNode]
//! <root>/k8s/pods.json                         [KubePod]
//! ```
//!
//! A missing or malformed file fails only the call that reads it.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{CollectorError, CollectorResult};
use crate::providers::aws::{self, AutoScalingGroup, AwsApi, EksCluster, Nodegroup, Reservation, Subnet, Vpc};
use crate::providers::azure::{self, AzureApi, VirtualMachine};
use crate::providers::gcp::{self, GcpApi, GkeCluster, Network, Subnetwork, ZoneInstances};
use crate::providers::k8s::{
    EventStream, KubeEventSource, KubeNode, KubeObject, KubePod, WatchEvent, WatchedResource,
};

/// Environment variable naming the snapshot directory
pub const SNAPSHOT_DIR_ENV: &str = "ASSET_SNAPSHOT_DIR";

/// Directory used when the variable is unset
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshot";

#[derive(Debug, Clone)]
pub struct SnapshotSource {
    root: PathBuf,
}

impl SnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        let root = std::env::var(SNAPSHOT_DIR_ENV).unwrap_or_else(|_| DEFAULT_SNAPSHOT_DIR.to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: DeserializeOwned>(&self, relative: &Path) -> Result<T, String> {
        let path = self.root.join(relative);
        debug!(path = %path.display(), "reading snapshot");
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {e}", path.display()))?;
        serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
    }

    async fn read<T: DeserializeOwned>(
        &self,
        provider: &'static str,
        operation: &str,
        relative: PathBuf,
    ) -> CollectorResult<T> {
        self.read_json(&relative)
            .await
            .map_err(|message| CollectorError::provider(provider, operation, message))
    }

    fn aws_path(region: &str, file: &str) -> PathBuf {
        Path::new("aws").join(region).join(file)
    }

    fn gcp_path(project: &str, file: &str) -> PathBuf {
        Path::new("gcp").join(project).join(file)
    }
}

fn missing(provider: &'static str, operation: &str, what: &str) -> CollectorError {
    CollectorError::provider(provider, operation, format!("{what} not found"))
}

#[async_trait]
impl AwsApi for SnapshotSource {
    async fn describe_instances(&self, region: &str) -> CollectorResult<Vec<Reservation>> {
        self.read(aws::PROVIDER, "DescribeInstances", Self::aws_path(region, "instances.json"))
            .await
    }

    async fn describe_vpcs(&self, region: &str) -> CollectorResult<Vec<Vpc>> {
        self.read(aws::PROVIDER, "DescribeVpcs", Self::aws_path(region, "vpcs.json"))
            .await
    }

    async fn describe_subnets(&self, region: &str) -> CollectorResult<Vec<Subnet>> {
        self.read(aws::PROVIDER, "DescribeSubnets", Self::aws_path(region, "subnets.json"))
            .await
    }

    async fn list_eks_clusters(&self, region: &str) -> CollectorResult<Vec<String>> {
        let clusters: Vec<EksCluster> = self
            .read(aws::PROVIDER, "ListClusters", Self::aws_path(region, "eks_clusters.json"))
            .await?;
        Ok(clusters.into_iter().filter_map(|c| c.name).collect())
    }

    async fn describe_eks_cluster(&self, region: &str, name: &str) -> CollectorResult<EksCluster> {
        let clusters: Vec<EksCluster> = self
            .read(aws::PROVIDER, "DescribeCluster", Self::aws_path(region, "eks_clusters.json"))
            .await?;
        clusters
            .into_iter()
            .find(|c| c.name.as_deref() == Some(name))
            .ok_or_else(|| missing(aws::PROVIDER, "DescribeCluster", name))
    }

    async fn list_nodegroups(&self, region: &str, cluster: &str) -> CollectorResult<Vec<String>> {
        let groups: BTreeMap<String, Vec<Nodegroup>> = self
            .read(aws::PROVIDER, "ListNodegroups", Self::aws_path(region, "nodegroups.json"))
            .await?;
        Ok(groups
            .get(cluster)
            .map(|ngs| ngs.iter().filter_map(|ng| ng.nodegroup_name.clone()).collect())
            .unwrap_or_default())
    }

    async fn describe_nodegroup(
        &self,
        region: &str,
        cluster: &str,
        nodegroup: &str,
    ) -> CollectorResult<Nodegroup> {
        let groups: BTreeMap<String, Vec<Nodegroup>> = self
            .read(aws::PROVIDER, "DescribeNodegroup", Self::aws_path(region, "nodegroups.json"))
            .await?;
        groups
            .get(cluster)
            .and_then(|ngs| {
                ngs.iter()
                    .find(|ng| ng.nodegroup_name.as_deref() == Some(nodegroup))
                    .cloned()
            })
            .ok_or_else(|| missing(aws::PROVIDER, "DescribeNodegroup", nodegroup))
    }

    async fn describe_autoscaling_groups(
        &self,
        region: &str,
        names: &[String],
    ) -> CollectorResult<Vec<AutoScalingGroup>> {
        let groups: Vec<AutoScalingGroup> = self
            .read(
                aws::PROVIDER,
                "DescribeAutoScalingGroups",
                Self::aws_path(region, "autoscaling_groups.json"),
            )
            .await?;
        Ok(groups
            .into_iter()
            .filter(|g| {
                g.auto_scaling_group_name
                    .as_ref()
                    .is_some_and(|n| names.contains(n))
            })
            .collect())
    }
}

/// `zone eq .*<region>.*` → `<region>`
fn filter_region(filter: &str) -> Option<&str> {
    filter.strip_prefix("zone eq .*")?.strip_suffix(".*")
}

#[async_trait]
impl GcpApi for SnapshotSource {
    async fn list_networks(&self, project: &str) -> CollectorResult<Vec<Network>> {
        self.read(gcp::PROVIDER, "networks.list", Self::gcp_path(project, "networks.json"))
            .await
    }

    async fn list_subnetworks(&self, project: &str) -> CollectorResult<Vec<Subnetwork>> {
        self.read(
            gcp::PROVIDER,
            "subnetworks.aggregatedList",
            Self::gcp_path(project, "subnetworks.json"),
        )
        .await
    }

    async fn aggregated_list_instances(
        &self,
        project: &str,
        filter: Option<&str>,
    ) -> CollectorResult<Vec<ZoneInstances>> {
        let mut zones: Vec<ZoneInstances> = self
            .read(
                gcp::PROVIDER,
                "instances.aggregatedList",
                Self::gcp_path(project, "instances.json"),
            )
            .await?;
        if let Some(region) = filter.and_then(filter_region) {
            zones.retain(|z| z.zone.contains(region));
        }
        Ok(zones)
    }

    async fn list_clusters(&self, parent: &str) -> CollectorResult<Vec<GkeCluster>> {
        let mut segments = parent.split('/');
        let (Some("projects"), Some(project), Some("locations"), Some(location)) =
            (segments.next(), segments.next(), segments.next(), segments.next())
        else {
            return Err(CollectorError::provider(
                gcp::PROVIDER,
                "clusters.list",
                format!("malformed parent {parent}"),
            ));
        };
        let clusters: Vec<GkeCluster> = self
            .read(gcp::PROVIDER, "clusters.list", Self::gcp_path(project, "clusters.json"))
            .await?;
        Ok(clusters
            .into_iter()
            .filter(|c| location == "-" || c.location.as_deref() == Some(location))
            .collect())
    }
}

#[async_trait]
impl AzureApi for SnapshotSource {
    async fn list_subscriptions(&self) -> CollectorResult<Vec<String>> {
        self.read(
            azure::PROVIDER,
            "Subscriptions.List",
            Path::new("azure").join("subscriptions.json"),
        )
        .await
    }

    async fn list_vms(&self, subscription: &str) -> CollectorResult<Vec<VirtualMachine>> {
        self.read(
            azure::PROVIDER,
            "VirtualMachines.ListAll",
            Path::new("azure").join(subscription).join("vms.json"),
        )
        .await
    }
}

#[async_trait]
impl KubeEventSource for SnapshotSource {
    /// Every saved object arrives as an Added event; the stream then stays
    /// open like a real watch
    async fn watch(&self, resource: WatchedResource) -> CollectorResult<EventStream> {
        let objects: Vec<KubeObject> = match resource {
            WatchedResource::Nodes => {
                let nodes: Vec<KubeNode> = self
                    .read_json(&Path::new("k8s").join("nodes.json"))
                    .await
                    .map_err(CollectorError::Watcher)?;
                nodes.into_iter().map(KubeObject::Node).collect()
            }
            WatchedResource::Pods => {
                let pods: Vec<KubePod> = self
                    .read_json(&Path::new("k8s").join("pods.json"))
                    .await
                    .map_err(CollectorError::Watcher)?;
                pods.into_iter().map(KubeObject::Pod).collect()
            }
        };
        let events = objects.into_iter().map(|o| Ok(WatchEvent::added(o)));
        Ok(stream::iter(events).chain(stream::pending()).boxed())
    }
}
