// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPCs and subnets

use super::types::tag_map;
use super::AwsApi;
use crate::asset::{AssetType, CloudProvider, Ean};
use crate::errors::CollectorResult;
use crate::providers::{skip_item, Emitter};
use crate::scheduler::Shutdown;

pub async fn collect_vpcs(
    api: &dyn AwsApi,
    emitter: &Emitter,
    region: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let vpcs = shutdown.guard(api.describe_vpcs(region)).await?;

    let mut published = 0;
    for vpc in &vpcs {
        let Some(id) = vpc.vpc_id.as_deref().filter(|id| !id.is_empty()) else {
            skip_item(AssetType::AwsVpc, "VpcId");
            continue;
        };
        let mut builder = emitter
            .record(AssetType::AwsVpc, id)
            .provider(CloudProvider::Aws)
            .region(region)
            .tags(tag_map(&vpc.tags))
            .metadata_entry("isDefault", vpc.is_default);
        if let Some(owner) = &vpc.owner_id {
            builder = builder.account(owner.as_str());
        }
        emitter.emit(builder).await;
        published += 1;
    }
    Ok(published)
}

pub async fn collect_subnets(
    api: &dyn AwsApi,
    emitter: &Emitter,
    region: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let subnets = shutdown.guard(api.describe_subnets(region)).await?;

    let mut published = 0;
    for subnet in &subnets {
        let Some(id) = subnet.subnet_id.as_deref().filter(|id| !id.is_empty()) else {
            skip_item(AssetType::AwsSubnet, "SubnetId");
            continue;
        };
        let parents: Vec<Ean> = subnet
            .vpc_id
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| Ean::network(v.as_str()))
            .collect();

        let mut builder = emitter
            .record(AssetType::AwsSubnet, id)
            .provider(CloudProvider::Aws)
            .region(region)
            .parents(parents)
            .tags(tag_map(&subnet.tags));
        if let Some(owner) = &subnet.owner_id {
            builder = builder.account(owner.as_str());
        }
        if let Some(state) = &subnet.state {
            builder = builder.metadata_entry("state", state.as_str());
        }
        emitter.emit(builder).await;
        published += 1;
    }
    Ok(published)
}
