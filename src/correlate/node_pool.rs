// Copyright (c) 2025 - Cowboy AI, Inc.
//! Node-pool / instance membership matching
//!
//! GKE node VMs carry their Kubernetes labels as a single metadata item,
//! `kube-labels`, whose value is a comma separated list of `key=value`
//! pairs. A VM belongs to a cluster when its `cloud.google.com/gke-nodepool`
//! label names one of the cluster's node pools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;

use crate::cache::{CacheSummary, CrossRefCache};
use crate::errors::CollectorResult;

/// Metadata item key holding the serialized label blob
pub const KUBE_LABELS_KEY: &str = "kube-labels";

/// Label naming the node pool a VM belongs to
pub const NODE_POOL_LABEL: &str = "cloud.google.com/gke-nodepool";

/// One raw instance metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl MetadataItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Cached view of a compute instance, enough to match it to a cluster
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSummary {
    pub id: String,
    pub region: String,
    pub account: String,
    pub metadata_items: Vec<MetadataItem>,
}

impl CacheSummary for InstanceSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Parse the `kube-labels` blob out of raw metadata.
///
/// Entries without `=` are skipped; the value may itself contain `=`.
pub fn kube_labels(items: &[MetadataItem]) -> BTreeMap<String, String> {
    items
        .iter()
        .filter(|item| item.key == KUBE_LABELS_KEY)
        .flat_map(|item| item.value.split(','))
        .filter_map(|entry| entry.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Does the instance's label map place it in one of `node_pools`?
pub fn is_member(items: &[MetadataItem], node_pools: &[String]) -> bool {
    kube_labels(items)
        .get(NODE_POOL_LABEL)
        .is_some_and(|pool| node_pools.iter().any(|p| p == pool))
}

/// Ids of the `candidates` that belong to one of `node_pools`, in order
pub fn member_ids<'a, I>(candidates: I, node_pools: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a InstanceSummary>,
{
    candidates
        .into_iter()
        .filter(|c| is_member(&c.metadata_items, node_pools))
        .map(|c| c.id.clone())
        .collect()
}

/// Compute the instance ids backing a cluster.
///
/// When the instance cache holds anything, candidates come from it,
/// restricted to `region` because the cache spans every region. Otherwise
/// `fallback` is awaited for a live, region-filtered listing. Errors from
/// the fallback are returned; the caller decides to publish without
/// children.
pub async fn cluster_instance_ids<F, Fut>(
    cache: &CrossRefCache<InstanceSummary>,
    region: &str,
    node_pools: &[String],
    fallback: F,
) -> CollectorResult<Vec<String>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = CollectorResult<Vec<InstanceSummary>>>,
{
    if node_pools.is_empty() {
        return Ok(Vec::new());
    }

    let cached = cache.get_all();
    if !cached.is_empty() {
        let in_region = cached
            .iter()
            .map(|(_, summary)| summary)
            .filter(|summary| summary.region == region);
        return Ok(member_ids(in_region, node_pools));
    }

    tracing::debug!(region, "instance cache empty, listing instances for node-pool match");
    let listed = fallback().await?;
    Ok(member_ids(&listed, node_pools))
}
