// Copyright (c) 2025 - Cowboy AI, Inc.
//! AWS collector
//!
//! Regional: every pass launches one task per (region, enabled type).
//! Supported types: EC2 instances, VPCs, subnets and EKS clusters.

pub mod ec2;
pub mod eks;
pub mod types;
pub mod vpc;

use async_trait::async_trait;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::asset::{AssetType, CloudProvider};
use crate::config::AwsConfig;
use crate::errors::CollectorResult;
use crate::providers::Emitter;
use crate::scheduler::{CollectionTask, Collector, Shutdown};
use crate::sink::AssetSink;

pub use types::{
    arn_account, tag_map, AutoScalingGroup, EksCluster, Instance, Nodegroup, Reservation, Subnet,
    Tag, Vpc,
};

/// Provider label used in errors
pub const PROVIDER: &str = "aws";

/// Boundary to the AWS SDK; every listing is fully paginated
#[async_trait]
pub trait AwsApi: Send + Sync {
    async fn describe_instances(&self, region: &str) -> CollectorResult<Vec<Reservation>>;

    async fn describe_vpcs(&self, region: &str) -> CollectorResult<Vec<Vpc>>;

    async fn describe_subnets(&self, region: &str) -> CollectorResult<Vec<Subnet>>;

    /// Cluster names
    async fn list_eks_clusters(&self, region: &str) -> CollectorResult<Vec<String>>;

    async fn describe_eks_cluster(&self, region: &str, name: &str)
        -> CollectorResult<EksCluster>;

    /// Node group names of one cluster
    async fn list_nodegroups(&self, region: &str, cluster: &str) -> CollectorResult<Vec<String>>;

    async fn describe_nodegroup(
        &self,
        region: &str,
        cluster: &str,
        nodegroup: &str,
    ) -> CollectorResult<Nodegroup>;

    async fn describe_autoscaling_groups(
        &self,
        region: &str,
        names: &[String],
    ) -> CollectorResult<Vec<AutoScalingGroup>>;
}

pub struct AwsCollector {
    config: AwsConfig,
    api: Arc<dyn AwsApi>,
    emitter: Emitter,
}

impl AwsCollector {
    pub fn new(config: AwsConfig, api: Arc<dyn AwsApi>, sink: Arc<dyn AssetSink>) -> Self {
        let emitter = Emitter::new(sink, config.base.index_namespace.clone());
        Self {
            config,
            api,
            emitter,
        }
    }

    /// `None` for types AWS does not collect
    fn task(
        &self,
        asset_type: AssetType,
        region: &str,
        shutdown: &Shutdown,
    ) -> Option<CollectionTask> {
        let api = self.api.clone();
        let emitter = self.emitter.clone();
        let scope = region.to_string();
        let shutdown = shutdown.clone();
        let work = match asset_type {
            AssetType::AwsEc2Instance => async move {
                ec2::collect_instances(api.as_ref(), &emitter, &scope, &shutdown).await
            }
            .boxed(),
            AssetType::AwsVpc => async move {
                vpc::collect_vpcs(api.as_ref(), &emitter, &scope, &shutdown).await
            }
            .boxed(),
            AssetType::AwsSubnet => async move {
                vpc::collect_subnets(api.as_ref(), &emitter, &scope, &shutdown).await
            }
            .boxed(),
            AssetType::K8sCluster => async move {
                eks::collect_clusters(api.as_ref(), &emitter, &scope, &shutdown).await
            }
            .boxed(),
            AssetType::GcpComputeInstance
            | AssetType::GcpVpc
            | AssetType::GcpSubnet
            | AssetType::AzureVmInstance
            | AssetType::K8sNode
            | AssetType::K8sPod
            | AssetType::K8sContainer => return None,
        };
        Some(CollectionTask::new(asset_type, region, work))
    }
}

#[async_trait]
impl Collector for AwsCollector {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Aws
    }

    fn period(&self) -> Duration {
        self.config.base.period()
    }

    fn pass(&self, shutdown: &Shutdown) -> Vec<CollectionTask> {
        let mut tasks = Vec::new();
        for region in &self.config.regions {
            for &asset_type in CloudProvider::Aws.asset_types() {
                if self.config.base.is_type_enabled(asset_type) {
                    tasks.extend(self.task(asset_type, region, shutdown));
                }
            }
        }
        tasks
    }
}
