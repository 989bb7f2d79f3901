// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider collectors
//!
//! Each provider module owns:
//! - an API trait, the boundary to the provider SDK (listings of raw items)
//! - the raw item types those listings return
//! - per-type collection routines that normalize, correlate and publish
//! - a [`Collector`](crate::scheduler::Collector) tying them to the scheduler

pub mod aws;
pub mod azure;
pub mod gcp;
pub mod k8s;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::asset::{AssetBuilder, AssetRecord, AssetType};
use crate::errors::{CollectorError, CollectorResult};
use crate::sink::AssetSink;

/// Builds records for one collector and hands them to the sink
#[derive(Clone)]
pub struct Emitter {
    sink: Arc<dyn AssetSink>,
    namespace: Option<String>,
}

impl Emitter {
    pub fn new(sink: Arc<dyn AssetSink>, namespace: Option<String>) -> Self {
        Self { sink, namespace }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Builder preset with type, kind, id, EAN and destination
    pub fn record(&self, asset_type: AssetType, id: impl Into<String>) -> AssetBuilder {
        AssetRecord::builder().typed(asset_type, id, self.namespace())
    }

    /// Fold the builder and publish the record
    pub async fn emit(&self, builder: AssetBuilder) {
        self.sink.publish(builder.build()).await;
    }
}

/// Log a listed item that cannot be described; siblings carry on
pub(crate) fn skip_item(asset_type: AssetType, field: &'static str) {
    let err = CollectorError::InvalidItem {
        asset_type: asset_type.as_str(),
        field,
    };
    warn!(asset_type = %asset_type, error = %err, "skipping item");
}

/// Per-scope outcomes of one task (projects, subscriptions). A failing
/// scope is logged and the rest continue; the task fails only when no scope
/// succeeded.
#[derive(Debug, Default)]
pub(crate) struct ScopeTally {
    published: usize,
    succeeded: usize,
    first_error: Option<CollectorError>,
}

impl ScopeTally {
    pub(crate) fn record(
        &mut self,
        scope: &str,
        asset_type: AssetType,
        outcome: CollectorResult<usize>,
    ) {
        match outcome {
            Ok(count) => {
                self.published += count;
                self.succeeded += 1;
            }
            Err(CollectorError::Cancelled) => {
                debug!(scope, asset_type = %asset_type, "scope collection cancelled");
                self.first_error.get_or_insert(CollectorError::Cancelled);
            }
            Err(e) => {
                warn!(scope, asset_type = %asset_type, error = %e, "scope collection failed");
                self.first_error.get_or_insert(e);
            }
        }
    }

    pub(crate) fn finish(self) -> CollectorResult<usize> {
        match self.first_error {
            Some(e) if self.succeeded == 0 => Err(e),
            _ => Ok(self.published),
        }
    }
}

/// Does an allow-list (empty = everything) contain `value`?
pub(crate) fn wanted(allow: &[String], value: &str) -> bool {
    allow.is_empty() || allow.iter().any(|a| a == value)
}
