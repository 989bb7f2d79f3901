// Copyright (c) 2025 - Cowboy AI, Inc.
//! GCP collector
//!
//! Project-scoped: every pass launches one task per enabled type and each
//! task walks every configured project. The four types share three
//! cross-reference caches that outlive individual passes:
//!
//! | writer   | cache     | reader                              |
//! |----------|-----------|-------------------------------------|
//! | vpc      | vpcs      | subnet parents, GKE cluster parents |
//! | subnet   | subnets   | compute instance parents            |
//! | compute  | instances | GKE cluster children                |
//!
//! Tasks of one pass run concurrently, so a reader usually sees what the
//! writer stored during the previous pass. Entries live for two periods.

pub mod compute;
pub mod gke;
pub mod types;
pub mod vpc;

use async_trait::async_trait;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::asset::{AssetType, CloudProvider};
use crate::cache::{CacheSummary, CrossRefCache, DEFAULT_CAPACITY};
use crate::config::GcpConfig;
use crate::correlate::InstanceSummary;
use crate::errors::CollectorResult;
use crate::providers::Emitter;
use crate::scheduler::{CollectionTask, Collector, Shutdown};
use crate::sink::AssetSink;

pub use types::{ComputeInstance, GkeCluster, Network, Subnetwork, ZoneInstances};

/// Provider label used in errors
pub const PROVIDER: &str = "gcp";

/// Boundary to the Compute and Container APIs; listings are fully paginated
#[async_trait]
pub trait GcpApi: Send + Sync {
    async fn list_networks(&self, project: &str) -> CollectorResult<Vec<Network>>;

    /// Subnetworks of every region
    async fn list_subnetworks(&self, project: &str) -> CollectorResult<Vec<Subnetwork>>;

    /// Aggregated instance listing grouped by zone, optionally filtered
    async fn aggregated_list_instances(
        &self,
        project: &str,
        filter: Option<&str>,
    ) -> CollectorResult<Vec<ZoneInstances>>;

    /// Clusters under `parent` (`projects/<p>/locations/<l>`)
    async fn list_clusters(&self, parent: &str) -> CollectorResult<Vec<GkeCluster>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcSummary {
    pub id: String,
    pub name: String,
    pub account: String,
}

impl CacheSummary for VpcSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetSummary {
    pub id: String,
    pub name: String,
    pub account: String,
    pub region: String,
}

impl CacheSummary for SubnetSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Cross-reference caches shared by the GCP tasks
#[derive(Debug)]
pub struct GcpCaches {
    pub vpcs: CrossRefCache<VpcSummary>,
    pub subnets: CrossRefCache<SubnetSummary>,
    pub instances: CrossRefCache<InstanceSummary>,
    pub ttl: Duration,
}

impl GcpCaches {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            vpcs: CrossRefCache::new(capacity),
            subnets: CrossRefCache::new(capacity),
            instances: CrossRefCache::new(capacity),
            ttl,
        }
    }
}

/// Shared state handed to every GCP task
pub struct GcpContext {
    pub api: Arc<dyn GcpApi>,
    pub caches: Arc<GcpCaches>,
    pub emitter: Emitter,
    pub projects: Vec<String>,
    /// Region allow-list; empty means every region
    pub regions: Vec<String>,
}

pub struct GcpCollector {
    config: GcpConfig,
    context: Arc<GcpContext>,
}

impl GcpCollector {
    pub fn new(config: GcpConfig, api: Arc<dyn GcpApi>, sink: Arc<dyn AssetSink>) -> Self {
        let caches = Arc::new(GcpCaches::new(DEFAULT_CAPACITY, config.base.cache_ttl()));
        Self::with_caches(config, api, sink, caches)
    }

    pub fn with_caches(
        config: GcpConfig,
        api: Arc<dyn GcpApi>,
        sink: Arc<dyn AssetSink>,
        caches: Arc<GcpCaches>,
    ) -> Self {
        let context = Arc::new(GcpContext {
            api,
            caches,
            emitter: Emitter::new(sink, config.base.index_namespace.clone()),
            projects: config.projects.clone(),
            regions: config.regions.clone(),
        });
        Self { config, context }
    }

    pub fn caches(&self) -> &Arc<GcpCaches> {
        &self.context.caches
    }

    /// `None` for types GCP does not collect
    fn task(&self, asset_type: AssetType, shutdown: &Shutdown) -> Option<CollectionTask> {
        let ctx = self.context.clone();
        let shutdown = shutdown.clone();
        let work = match asset_type {
            AssetType::GcpVpc => async move { vpc::collect_vpcs(&ctx, &shutdown).await }.boxed(),
            AssetType::GcpSubnet => {
                async move { vpc::collect_subnets(&ctx, &shutdown).await }.boxed()
            }
            AssetType::GcpComputeInstance => {
                async move { compute::collect_instances(&ctx, &shutdown).await }.boxed()
            }
            AssetType::K8sCluster => {
                async move { gke::collect_clusters(&ctx, &shutdown).await }.boxed()
            }
            AssetType::AwsEc2Instance
            | AssetType::AwsVpc
            | AssetType::AwsSubnet
            | AssetType::AzureVmInstance
            | AssetType::K8sNode
            | AssetType::K8sPod
            | AssetType::K8sContainer => return None,
        };
        Some(CollectionTask::new(asset_type, "*", work))
    }
}

#[async_trait]
impl Collector for GcpCollector {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Gcp
    }

    fn period(&self) -> Duration {
        self.config.base.period()
    }

    fn pass(&self, shutdown: &Shutdown) -> Vec<CollectionTask> {
        CloudProvider::Gcp
            .asset_types()
            .iter()
            .copied()
            .filter(|t| self.config.base.is_type_enabled(*t))
            .filter_map(|t| self.task(t, shutdown))
            .collect()
    }
}
