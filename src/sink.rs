// Copyright (c) 2025 - Cowboy AI, Inc.
//! Publish sinks
//!
//! Collectors hand every built record to an [`AssetSink`] exactly once. The
//! sink owns delivery: nothing is returned to the collector, and failures
//! are logged where they happen.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

use crate::asset::{AssetRecord, AssetType, Ean};

/// Fire-and-forget record sink
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// Deliver one record
    async fn publish(&self, record: AssetRecord);
}

#[async_trait]
impl<S: AssetSink + ?Sized> AssetSink for Arc<S> {
    async fn publish(&self, record: AssetRecord) {
        (**self).publish(record).await
    }
}

/// Writes one JSON document per line to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl AssetSink for StdoutSink {
    async fn publish(&self, record: AssetRecord) {
        let mut line = match serde_json::to_vec(&record) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "failed to serialize asset record");
                return;
            }
        };
        line.push(b'\n');

        let mut stdout = tokio::io::stdout();
        if let Err(e) = stdout.write_all(&line).await {
            warn!(error = %e, "failed to write asset record to stdout");
        }
    }
}

/// Collects records in memory
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<AssetRecord>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record published so far, in publish order
    pub fn records(&self) -> Vec<AssetRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records of one asset type, in publish order
    pub fn of_type(&self, asset_type: AssetType) -> Vec<AssetRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.asset_type == Some(asset_type))
            .collect()
    }

    /// First record carrying `ean`
    pub fn find(&self, ean: &Ean) -> Option<AssetRecord> {
        self.records()
            .into_iter()
            .find(|r| r.ean.as_ref() == Some(ean))
    }
}

#[async_trait]
impl AssetSink for InMemorySink {
    async fn publish(&self, record: AssetRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}
