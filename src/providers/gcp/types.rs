// Copyright (c) 2025 - Cowboy AI, Inc.
//! Raw GCP API items and link helpers
//!
//! Shapes follow the Compute and Container REST JSON (camelCase). Resource
//! ids are uint64 values that the REST API renders as strings; both forms
//! are accepted.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::correlate::MetadataItem;

/// Prefix turning a GKE network path into a Compute self link
pub const COMPUTE_API_PREFIX: &str = "https://www.googleapis.com/compute/v1/";

fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(default, deserialize_with = "id_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnetwork {
    #[serde(default, deserialize_with = "id_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub self_link: Option<String>,
    /// Self link of the parent network
    pub network: Option<String>,
    /// Region URL, `.../regions/<name>`
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub subnetwork: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    #[serde(default)]
    pub items: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeInstance {
    #[serde(default, deserialize_with = "id_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub self_link: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub metadata: InstanceMetadata,
}

/// One scope of an aggregated instance listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInstances {
    /// Scope key, e.g. `zones/europe-west1-d`
    pub zone: String,
    #[serde(default)]
    pub instances: Vec<ComputeInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePool {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// `projects/<p>/global/networks/<name>`
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GkeCluster {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub network_config: Option<NetworkConfig>,
    #[serde(default)]
    pub node_pools: Vec<NodePool>,
    #[serde(default)]
    pub resource_labels: BTreeMap<String, String>,
}

impl GkeCluster {
    /// Compute self link of the cluster network, when known
    pub fn network_self_link(&self) -> Option<String> {
        self.network_config
            .as_ref()
            .and_then(|c| c.network.as_deref())
            .filter(|n| !n.is_empty())
            .map(|n| format!("{COMPUTE_API_PREFIX}{n}"))
    }

    pub fn node_pool_names(&self) -> Vec<String> {
        self.node_pools.iter().filter_map(|p| p.name.clone()).collect()
    }
}

/// Last `/` segment of a resource URL
pub fn resource_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// `.../zones/europe-west1-d` → `europe-west1`
pub fn region_from_zone(zone: &str) -> String {
    let name = resource_name(zone);
    match name.rsplit_once('-') {
        Some((region, _)) => region.to_string(),
        None => String::new(),
    }
}

/// Zone allow-list check through the zone's region; empty allows all
pub fn want_zone(zone: &str, regions: &[String]) -> bool {
    regions.is_empty() || regions.iter().any(|r| *r == region_from_zone(zone))
}

/// Region URL allow-list check; empty allows all
pub fn want_region(region_url: &str, regions: &[String]) -> bool {
    regions.is_empty() || regions.iter().any(|r| r == resource_name(region_url))
}

/// `ListClusters` parents for one project
pub fn cluster_parents(project: &str, regions: &[String]) -> Vec<String> {
    if regions.is_empty() {
        return vec![format!("projects/{project}/locations/-")];
    }
    regions
        .iter()
        .map(|r| format!("projects/{project}/locations/{r}"))
        .collect()
}

/// Aggregated-list filter matching zones of one region
pub fn zone_filter(region: &str) -> String {
    format!("zone eq .*{region}.*")
}
