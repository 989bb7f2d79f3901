// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Collector Service
//!
//! Runs one collector per configured provider and publishes every asset
//! record to NATS (subject = record destination) or, with `nats.enabled =
//! false`, to stdout as JSON lines.
//!
//! Run with: cargo run --bin asset-collector
//!
//! Environment:
//! - `ASSET_COLLECTOR_CONFIG`: config file (default `asset-collector.toml`)
//! - `NATS_URL`: comma separated server override
//! - `ASSET_SNAPSHOT_DIR`: directory of raw provider listings
//! - `RUST_LOG`: log filter (default `info`)

use anyhow::{Context, Result};
use cim_asset_collector::{
    config::CollectorConfig,
    providers::{
        aws::AwsCollector,
        azure::AzureCollector,
        gcp::GcpCollector,
        k8s::{GceMetadataClient, K8sCollector},
    },
    run_all, shutdown_channel, AssetSink, Collector, NatsAssetSink, NatsClient, SnapshotSource,
    StdoutSink,
};
use std::sync::Arc;
use tracing::{error, info, warn};

async fn build_sink(config: &CollectorConfig) -> Result<Arc<dyn AssetSink>> {
    if !config.nats.enabled {
        info!("📤 NATS disabled, writing records to stdout");
        return Ok(Arc::new(StdoutSink));
    }
    info!("🔌 Connecting to NATS at {:?}", config.nats.servers);
    let client = NatsClient::new(&config.nats)
        .await
        .context("Failed to connect to NATS")?;
    info!("✅ Connected to NATS");
    Ok(Arc::new(NatsAssetSink::new(client)))
}

fn build_collectors(
    config: &CollectorConfig,
    source: Arc<SnapshotSource>,
    sink: Arc<dyn AssetSink>,
) -> Result<Vec<Arc<dyn Collector>>> {
    let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();

    if let Some(aws) = &config.aws {
        collectors.push(Arc::new(AwsCollector::new(
            aws.clone(),
            source.clone(),
            sink.clone(),
        )));
    }
    if let Some(gcp) = &config.gcp {
        collectors.push(Arc::new(GcpCollector::new(
            gcp.clone(),
            source.clone(),
            sink.clone(),
        )));
    }
    if let Some(azure) = &config.azure {
        collectors.push(Arc::new(AzureCollector::new(
            azure.clone(),
            source.clone(),
            sink.clone(),
        )));
    }
    if let Some(k8s) = &config.k8s {
        let mut collector = K8sCollector::new(k8s.clone(), source.clone(), sink.clone());
        if k8s.in_cluster {
            let metadata =
                GceMetadataClient::new().context("Failed to build metadata client")?;
            collector = collector.with_metadata(Arc::new(metadata));
        }
        collectors.push(Arc::new(collector));
    }
    Ok(collectors)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting Asset Collector");

    // Load configuration
    let config = CollectorConfig::load().context("Failed to load configuration")?;
    let providers = config.enabled_providers();
    info!("📋 Configuration loaded:");
    info!("  - Providers: {:?}", providers);
    info!("  - NATS enabled: {}", config.nats.enabled);
    if providers.is_empty() {
        warn!("⚠️ No provider sections configured, nothing to collect");
        return Ok(());
    }

    let source = Arc::new(SnapshotSource::from_env());
    info!("  - Snapshot dir: {}", source.root().display());

    let sink = build_sink(&config).await?;
    let collectors = build_collectors(&config, source, sink)?;

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("🛑 Interrupt received, shutting down"),
            Err(e) => error!("⚠️ Failed to listen for interrupt: {}", e),
        }
        trigger.cancel();
    });

    info!("🎧 Running {} collectors", collectors.len());
    for (provider, result) in run_all(collectors, shutdown).await {
        match result {
            Ok(summary) => info!(
                "✅ {} collector stopped after {} passes ({:?})",
                provider, summary.passes, summary.final_state
            ),
            Err(e) => error!("❌ {} collector failed: {}", provider, e),
        }
    }

    Ok(())
}
