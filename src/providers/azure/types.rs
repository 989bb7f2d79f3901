// Copyright (c) 2025 - Cowboy AI, Inc.
//! Raw Azure Resource Manager items (camelCase REST JSON)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceViewStatus {
    pub code: Option<String>,
    pub display_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    #[serde(default)]
    pub statuses: Vec<InstanceViewStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmProperties {
    pub vm_id: Option<String>,
    pub instance_view: Option<InstanceView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    /// ARM resource id
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub properties: Option<VmProperties>,
}

impl VirtualMachine {
    pub fn vm_id(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.vm_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Display status of the power state entry. The instance view lists
    /// provisioning state first and power state second; with fewer than two
    /// entries the state is unknown.
    pub fn power_state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.instance_view.as_ref())
            .and_then(|v| v.statuses.get(1))
            .and_then(|s| s.display_status.as_deref())
    }

    pub fn resource_group(&self) -> Option<&str> {
        self.id.as_deref().and_then(resource_group_from_id)
    }
}

/// `/subscriptions/<s>/resourceGroups/<rg>/providers/...` → `<rg>`
pub fn resource_group_from_id(id: &str) -> Option<&str> {
    id.split('/').nth(4).filter(|rg| !rg.is_empty())
}
