// Copyright (c) 2025 - Cowboy AI, Inc.
//! Raw AWS API items
//!
//! Field names follow the AWS JSON wire shapes (PascalCase for EC2 and
//! Auto Scaling, camelCase for EKS) so recorded API responses deserialize
//! directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Tag list as a plain map; tags without a key are dropped
pub fn tag_map(tags: &[Tag]) -> BTreeMap<String, String> {
    tags.iter()
        .filter_map(|t| {
            let key = t.key.clone()?;
            Some((key, t.value.clone().unwrap_or_default()))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    pub owner_id: Option<String>,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub instance_id: Option<String>,
    pub subnet_id: Option<String>,
    pub state: Option<InstanceState>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vpc {
    pub vpc_id: Option<String>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    pub subnet_id: Option<String>,
    pub vpc_id: Option<String>,
    pub owner_id: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfig {
    pub vpc_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EksCluster {
    pub name: Option<String>,
    pub arn: Option<String>,
    pub status: Option<String>,
    pub resources_vpc_config: Option<VpcConfig>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodegroupAsg {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodegroupResources {
    #[serde(default)]
    pub auto_scaling_groups: Vec<NodegroupAsg>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nodegroup {
    pub nodegroup_name: Option<String>,
    pub resources: Option<NodegroupResources>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AsgInstance {
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoScalingGroup {
    pub auto_scaling_group_name: Option<String>,
    #[serde(default)]
    pub instances: Vec<AsgInstance>,
}

/// Account id field of an ARN (`arn:partition:service:region:account:resource`)
pub fn arn_account(arn: &str) -> Option<&str> {
    let mut parts = arn.splitn(6, ':');
    if parts.next()? != "arn" {
        return None;
    }
    let account = parts.nth(3)?;
    parts.next()?;
    Some(account).filter(|a| !a.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("arn:aws:eks:eu-west-1:111122223333:cluster/prod", Some("111122223333"))]
    #[test_case("arn:aws:eks:eu-west-1::cluster/prod", None)]
    #[test_case("not-an-arn", None)]
    #[test_case("arn:aws:eks", None)]
    fn test_arn_account(arn: &str, expected: Option<&str>) {
        assert_eq!(arn_account(arn), expected);
    }

    #[test]
    fn test_ec2_wire_shape() {
        let json = r#"{
            "OwnerId": "111",
            "Instances": [{
                "InstanceId": "i-1",
                "SubnetId": "subnet-1",
                "State": {"Name": "running"},
                "Tags": [{"Key": "team", "Value": "x"}, {"Value": "orphan"}]
            }]
        }"#;
        let reservation: Reservation = serde_json::from_str(json).unwrap();
        let instance = &reservation.instances[0];
        assert_eq!(instance.subnet_id.as_deref(), Some("subnet-1"));
        let tags = tag_map(&instance.tags);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["team"], "x");
    }

    #[test]
    fn test_eks_wire_shape() {
        let json = r#"{
            "name": "prod",
            "arn": "arn:aws:eks:eu-west-1:111:cluster/prod",
            "status": "ACTIVE",
            "resourcesVpcConfig": {"vpcId": "vpc-1"}
        }"#;
        let cluster: EksCluster = serde_json::from_str(json).unwrap();
        assert_eq!(
            cluster.resources_vpc_config.and_then(|c| c.vpc_id).as_deref(),
            Some("vpc-1")
        );
    }
}
