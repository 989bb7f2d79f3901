// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-asset-collector
//!
//! Raw provider listings written into a temporary snapshot directory, plus
//! configuration builders. Every id is a fixed constant so assertions can
//! name the exact EANs they expect.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use cim_asset_collector::config::{AwsConfig, AzureConfig, BaseConfig, GcpConfig, K8sConfig};
use cim_asset_collector::SnapshotSource;

pub const AWS_REGION: &str = "eu-west-1";
pub const AWS_OWNER: &str = "111";
pub const EC2_INSTANCE_ID: &str = "i-0123456789abcdef0";
pub const AWS_SUBNET_ID: &str = "subnet-1";

pub const GCP_PROJECT: &str = "proj-1";
pub const GCP_REGION: &str = "europe-west1";
pub const GCP_VPC_LINK: &str =
    "https://www.googleapis.com/compute/v1/projects/proj-1/global/networks/default";
pub const GKE_CLUSTER_ID: &str = "gke-cluster-1";

pub const AZURE_SUBSCRIPTION: &str = "sub-1";

/// A snapshot directory that lives as long as the fixture
pub struct Snapshot {
    pub dir: TempDir,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn write(&self, relative: &str, body: &str) -> &Self {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
        fs::write(path, body).expect("write snapshot file");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source(&self) -> Arc<SnapshotSource> {
        Arc::new(SnapshotSource::new(self.path()))
    }
}

/// One EC2 instance in `subnet-1` tagged `team=x`
pub fn ec2_snapshot() -> Snapshot {
    let snapshot = Snapshot::new();
    snapshot.write(
        "aws/eu-west-1/instances.json",
        r#"[{
            "OwnerId": "111",
            "Instances": [{
                "InstanceId": "i-0123456789abcdef0",
                "SubnetId": "subnet-1",
                "State": {"Name": "running"},
                "Tags": [{"Key": "team", "Value": "x"}]
            }]
        }]"#,
    );
    snapshot
}

/// A GKE cluster in europe-west1 with node pool `np1` on the default VPC
pub fn gke_snapshot() -> Snapshot {
    let snapshot = Snapshot::new();
    snapshot.write(
        "gcp/proj-1/clusters.json",
        r#"[{
            "id": "gke-cluster-1",
            "name": "prod",
            "location": "europe-west1",
            "status": "RUNNING",
            "networkConfig": {"network": "projects/proj-1/global/networks/default"},
            "nodePools": [{"name": "np1"}],
            "resourceLabels": {"env": "prod"}
        }]"#,
    );
    snapshot
}

/// A subnet whose VPC was never listed
pub fn orphan_subnet_snapshot() -> Snapshot {
    let snapshot = Snapshot::new();
    snapshot.write(
        "gcp/proj-1/subnetworks.json",
        r#"[{
            "id": "7001",
            "name": "orphan",
            "selfLink": "https://www.googleapis.com/compute/v1/projects/proj-1/regions/europe-west1/subnetworks/orphan",
            "network": "https://www.googleapis.com/compute/v1/projects/proj-1/global/networks/never-seen",
            "region": "https://www.googleapis.com/compute/v1/projects/proj-1/regions/europe-west1"
        }]"#,
    );
    snapshot
}

pub fn base(asset_types: &[&str], period: u64) -> BaseConfig {
    BaseConfig {
        period,
        asset_types: asset_types.iter().map(|t| t.to_string()).collect(),
        index_namespace: None,
    }
}

pub fn aws_config(asset_types: &[&str]) -> AwsConfig {
    AwsConfig {
        base: base(asset_types, 60),
        regions: vec![AWS_REGION.to_string()],
        ..AwsConfig::default()
    }
}

pub fn gcp_config(asset_types: &[&str]) -> GcpConfig {
    GcpConfig {
        base: base(asset_types, 60),
        projects: vec![GCP_PROJECT.to_string()],
        regions: Vec::new(),
        credentials_file_path: None,
    }
}

pub fn azure_config(asset_types: &[&str]) -> AzureConfig {
    AzureConfig {
        base: base(asset_types, 60),
        subscription_id: Some(AZURE_SUBSCRIPTION.to_string()),
        ..AzureConfig::default()
    }
}

pub fn k8s_config(asset_types: &[&str]) -> K8sConfig {
    K8sConfig {
        base: base(asset_types, 60),
        ..K8sConfig::default()
    }
}
