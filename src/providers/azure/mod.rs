// Copyright (c) 2025 - Cowboy AI, Inc.
//! Azure collector
//!
//! One task per pass walks every subscription (the configured one, or all
//! subscriptions visible to the credentials) and publishes its virtual
//! machines.

pub mod types;
pub mod vm;

use async_trait::async_trait;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::asset::{AssetType, CloudProvider};
use crate::config::AzureConfig;
use crate::errors::CollectorResult;
use crate::providers::Emitter;
use crate::scheduler::{CollectionTask, Collector, Shutdown};
use crate::sink::AssetSink;

pub use types::{resource_group_from_id, InstanceView, InstanceViewStatus, VirtualMachine};

/// Provider label used in errors
pub const PROVIDER: &str = "azure";

/// Boundary to the Azure Resource Manager SDK
#[async_trait]
pub trait AzureApi: Send + Sync {
    /// Subscription ids visible to the credentials
    async fn list_subscriptions(&self) -> CollectorResult<Vec<String>>;

    /// Every VM of a subscription, with instance view statuses
    async fn list_vms(&self, subscription: &str) -> CollectorResult<Vec<VirtualMachine>>;
}

/// Filters and shared handles for the VM task
pub struct AzureContext {
    pub api: Arc<dyn AzureApi>,
    pub emitter: Emitter,
    pub subscription_id: Option<String>,
    /// Region allow-list; empty means every region
    pub regions: Vec<String>,
    pub resource_group: Option<String>,
}

impl AzureContext {
    /// Configured subscription, or every listed one
    pub async fn subscriptions(&self) -> CollectorResult<Vec<String>> {
        match self.subscription_id.as_deref().filter(|s| !s.is_empty()) {
            Some(id) => Ok(vec![id.to_string()]),
            None => self.api.list_subscriptions().await,
        }
    }
}

pub struct AzureCollector {
    config: AzureConfig,
    context: Arc<AzureContext>,
}

impl AzureCollector {
    pub fn new(config: AzureConfig, api: Arc<dyn AzureApi>, sink: Arc<dyn AssetSink>) -> Self {
        let context = Arc::new(AzureContext {
            api,
            emitter: Emitter::new(sink, config.base.index_namespace.clone()),
            subscription_id: config.subscription_id.clone(),
            regions: config.regions.clone(),
            resource_group: config.resource_group.clone(),
        });
        Self { config, context }
    }
}

#[async_trait]
impl Collector for AzureCollector {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Azure
    }

    fn period(&self) -> Duration {
        self.config.base.period()
    }

    fn pass(&self, shutdown: &Shutdown) -> Vec<CollectionTask> {
        if !self.config.base.is_type_enabled(AssetType::AzureVmInstance) {
            return Vec::new();
        }
        let ctx = self.context.clone();
        let shutdown = shutdown.clone();
        let scope = ctx.subscription_id.clone().unwrap_or_else(|| "*".to_string());
        vec![CollectionTask::new(
            AssetType::AzureVmInstance,
            scope,
            async move { vm::collect_vms(&ctx, &shutdown).await }.boxed(),
        )]
    }
}
