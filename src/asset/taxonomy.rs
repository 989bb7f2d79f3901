// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Taxonomy
//!
//! The closed vocabulary of providers, coarse asset kinds and fine-grained
//! asset types that collectors emit. The string forms are part of the
//! emitted document and of the destination routing string, so they must
//! never change for an existing variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cloud provider an asset was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
    K8s,
}

impl CloudProvider {
    /// Canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Gcp => "gcp",
            Self::Azure => "azure",
            Self::K8s => "k8s",
        }
    }

    /// Asset types this provider knows how to collect
    pub fn asset_types(&self) -> &'static [AssetType] {
        match self {
            Self::Aws => &[
                AssetType::AwsEc2Instance,
                AssetType::AwsVpc,
                AssetType::AwsSubnet,
                AssetType::K8sCluster,
            ],
            Self::Gcp => &[
                AssetType::GcpComputeInstance,
                AssetType::GcpVpc,
                AssetType::GcpSubnet,
                AssetType::K8sCluster,
            ],
            Self::Azure => &[AssetType::AzureVmInstance],
            Self::K8s => &[
                AssetType::K8sNode,
                AssetType::K8sPod,
                AssetType::K8sContainer,
            ],
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse asset category; the left half of an EAN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Virtual machines, Kubernetes nodes
    Host,
    /// VPCs, subnets
    Network,
    /// Kubernetes clusters
    Cluster,
    /// Pods
    ContainerGroup,
    /// Containers
    Container,
}

impl AssetKind {
    /// Canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Network => "network",
            Self::Cluster => "cluster",
            Self::ContainerGroup => "container_group",
            Self::Container => "container",
        }
    }

    /// Parse from the canonical string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "host" => Some(Self::Host),
            "network" => Some(Self::Network),
            "cluster" => Some(Self::Cluster),
            "container_group" => Some(Self::ContainerGroup),
            "container" => Some(Self::Container),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained asset type
///
/// These strings double as the allow-list entries accepted in the
/// `asset_types` configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "aws.ec2.instance")]
    AwsEc2Instance,
    #[serde(rename = "aws.vpc")]
    AwsVpc,
    #[serde(rename = "aws.subnet")]
    AwsSubnet,
    #[serde(rename = "gcp.compute.instance")]
    GcpComputeInstance,
    #[serde(rename = "gcp.vpc")]
    GcpVpc,
    #[serde(rename = "gcp.subnet")]
    GcpSubnet,
    #[serde(rename = "azure.vm.instance")]
    AzureVmInstance,
    #[serde(rename = "k8s.cluster")]
    K8sCluster,
    #[serde(rename = "k8s.node")]
    K8sNode,
    #[serde(rename = "k8s.pod")]
    K8sPod,
    #[serde(rename = "k8s.container")]
    K8sContainer,
}

impl AssetType {
    /// Canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsEc2Instance => "aws.ec2.instance",
            Self::AwsVpc => "aws.vpc",
            Self::AwsSubnet => "aws.subnet",
            Self::GcpComputeInstance => "gcp.compute.instance",
            Self::GcpVpc => "gcp.vpc",
            Self::GcpSubnet => "gcp.subnet",
            Self::AzureVmInstance => "azure.vm.instance",
            Self::K8sCluster => "k8s.cluster",
            Self::K8sNode => "k8s.node",
            Self::K8sPod => "k8s.pod",
            Self::K8sContainer => "k8s.container",
        }
    }

    /// Parse from the canonical string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "aws.ec2.instance" => Some(Self::AwsEc2Instance),
            "aws.vpc" => Some(Self::AwsVpc),
            "aws.subnet" => Some(Self::AwsSubnet),
            "gcp.compute.instance" => Some(Self::GcpComputeInstance),
            "gcp.vpc" => Some(Self::GcpVpc),
            "gcp.subnet" => Some(Self::GcpSubnet),
            "azure.vm.instance" => Some(Self::AzureVmInstance),
            "k8s.cluster" => Some(Self::K8sCluster),
            "k8s.node" => Some(Self::K8sNode),
            "k8s.pod" => Some(Self::K8sPod),
            "k8s.container" => Some(Self::K8sContainer),
            _ => None,
        }
    }

    /// The kind every asset of this type is published under
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::AwsEc2Instance
            | Self::GcpComputeInstance
            | Self::AzureVmInstance
            | Self::K8sNode => AssetKind::Host,

            Self::AwsVpc | Self::AwsSubnet | Self::GcpVpc | Self::GcpSubnet => {
                AssetKind::Network
            }

            Self::K8sCluster => AssetKind::Cluster,
            Self::K8sPod => AssetKind::ContainerGroup,
            Self::K8sContainer => AssetKind::Container,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
