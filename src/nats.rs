// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS client and asset sink
//!
//! Records are published as their flat JSON document to the subject equal
//! to the record's destination (`assets-{type}-{namespace}`).

use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::asset::AssetRecord;
use crate::destination::destination_for;
use crate::errors::{CollectorError, CollectorResult};
use crate::sink::AssetSink;

/// Configuration for NATS connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    /// Publish to NATS; when false records go to stdout
    pub enabled: bool,
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            servers: vec!["nats://localhost:4222".to_string()],
            name: "asset-collector".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl NatsConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect with the given configuration
    pub async fn new(config: &NatsConfig) -> CollectorResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout());

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| CollectorError::NatsConnection(e.to_string()))?;

        info!(servers = ?config.servers, "Connected to NATS");

        Ok(Self { client })
    }

    /// Publish a serializable message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> CollectorResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| CollectorError::NatsPublish(e.to_string()))?;

        debug!(subject, "Published message");
        Ok(())
    }

    /// Subscribe to a subject
    pub async fn subscribe(&self, subject: &str) -> CollectorResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| CollectorError::NatsConnection(e.to_string()))?;

        info!(subject, "Subscribed");
        Ok(subscriber)
    }

    /// Flush buffered publishes
    pub async fn flush(&self) -> CollectorResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| CollectorError::NatsPublish(e.to_string()))
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Sink publishing each record to its destination subject
#[derive(Clone)]
pub struct NatsAssetSink {
    client: NatsClient,
}

impl NatsAssetSink {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &NatsClient {
        &self.client
    }
}

/// Subject a record is published to
pub fn subject_for(record: &AssetRecord) -> Option<String> {
    record
        .destination
        .clone()
        .or_else(|| record.asset_type.map(|t| destination_for(t, None)))
}

#[async_trait]
impl AssetSink for NatsAssetSink {
    async fn publish(&self, record: AssetRecord) {
        let Some(subject) = subject_for(&record) else {
            warn!(ean = ?record.ean, "dropping asset record without type or destination");
            return;
        };
        if let Err(e) = self.client.publish(&subject, &record).await {
            warn!(subject = %subject, error = %e, "failed to publish asset record");
        }
    }
}
