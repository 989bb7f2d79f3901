// Copyright (c) 2025 - Cowboy AI, Inc.
//! The subset of Kubernetes Node and Pod objects the collector reads
//!
//! Field names follow the API server's JSON (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annotation GKE puts on nodes with the backing VM id
pub const GCE_INSTANCE_ID_ANNOTATION: &str = "container.googleapis.com/instance_id";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub uid: String,
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(rename = "providerID", default)]
    pub provider_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    #[serde(default)]
    pub conditions: Vec<NodeCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeNode {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NodeSpec,
    #[serde(default)]
    pub status: NodeStatus,
}

/// Cloud a node runs on, from its provider id scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCloud {
    Aws,
    Gce,
    Other,
}

impl KubeNode {
    pub fn cloud(&self) -> NodeCloud {
        let id = &self.spec.provider_id;
        if id.starts_with("aws") {
            NodeCloud::Aws
        } else if id.starts_with("gce") {
            NodeCloud::Gce
        } else {
            NodeCloud::Other
        }
    }

    /// `Ready`, `NotReady` or `Unknown`, from the Ready condition
    pub fn state(&self) -> &'static str {
        let ready = self
            .status
            .conditions
            .iter()
            .find(|c| c.condition_type == "Ready");
        match ready.map(|c| c.status.as_str()) {
            Some("True") => "Ready",
            Some("False") => "NotReady",
            _ => "Unknown",
        }
    }

    /// Id of the VM backing this node.
    ///
    /// AWS: `aws:///<zone>/<instance-id>`; Fargate ids have an extra
    /// segment and yield nothing. GCE: the instance id annotation.
    pub fn cloud_instance_id(&self) -> Option<String> {
        match self.cloud() {
            NodeCloud::Aws => {
                let parts: Vec<&str> = self.spec.provider_id.split('/').collect();
                match parts.as_slice() {
                    [_, _, _, _, id] if !id.is_empty() => Some(id.to_string()),
                    _ => None,
                }
            }
            NodeCloud::Gce => self
                .metadata
                .annotations
                .get(GCE_INSTANCE_ID_ANNOTATION)
                .filter(|id| !id.is_empty())
                .cloned(),
            NodeCloud::Other => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default)]
    pub node_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedState {
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    pub waiting: Option<serde_json::Value>,
    pub running: Option<StartedState>,
    pub terminated: Option<StartedState>,
}

impl ContainerState {
    /// Phase name and the time the container started, if it did
    pub fn phase(&self) -> (&'static str, Option<DateTime<Utc>>) {
        if self.waiting.is_some() {
            ("Waiting", None)
        } else if let Some(running) = &self.running {
            ("Running", running.started_at)
        } else if let Some(terminated) = &self.terminated {
            ("Terminated", terminated.started_at)
        } else {
            ("", None)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "containerID", default)]
    pub container_id: String,
    #[serde(default)]
    pub state: ContainerState,
}

impl ContainerStatus {
    /// Runtime id without its `<runtime>://` prefix; `None` when the
    /// container does not exist in the runtime yet
    pub fn runtime_id(&self) -> Option<&str> {
        let id = match self.container_id.split_once("://") {
            Some((_, id)) => id,
            None => self.container_id.as_str(),
        };
        Some(id).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
    #[serde(default)]
    pub init_container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubePod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

impl KubePod {
    /// App containers followed by init containers
    pub fn containers(&self) -> impl Iterator<Item = &ContainerStatus> {
        self.status
            .container_statuses
            .iter()
            .chain(self.status.init_container_statuses.iter())
    }
}
