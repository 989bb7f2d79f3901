// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset collection for the Composable Information Machine
//!
//! Polls cloud providers for infrastructure resources and emits one
//! normalized, correlated asset record per resource per pass.
//!
//! - [`asset`]: record model, EANs and the composable builder
//! - [`cache`]: TTL/LRU cross-reference cache shared between passes
//! - [`correlate`]: link resolution and node-pool membership
//! - [`scheduler`]: periodic passes, fan-out and cancellation
//! - [`providers`]: AWS, GCP, Azure and Kubernetes collectors
//! - [`sink`] and [`nats`]: where records go

pub mod asset;
pub mod cache;
pub mod config;
pub mod correlate;
pub mod destination;
pub mod errors;
pub mod nats;
pub mod providers;
pub mod scheduler;
pub mod sink;
pub mod snapshot;
pub mod state_machine;

// Re-export commonly used types
pub use asset::{AssetBuilder, AssetKind, AssetRecord, AssetType, CloudProvider, Ean};
pub use cache::{CacheSummary, CrossRefCache};
pub use config::CollectorConfig;
pub use errors::{CollectorError, CollectorResult};
pub use nats::{NatsAssetSink, NatsClient, NatsConfig};
pub use scheduler::{
    run_all, run_collector, shutdown_channel, CollectionTask, Collector, RunSummary, Shutdown,
    ShutdownTrigger,
};
pub use sink::{AssetSink, InMemorySink, StdoutSink};
pub use snapshot::SnapshotSource;
