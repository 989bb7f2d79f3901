// Copyright (c) 2025 - Cowboy AI, Inc.
//! EC2 instances

use tracing::debug;

use super::types::{tag_map, Instance};
use super::AwsApi;
use crate::asset::{AssetBuilder, AssetType, CloudProvider, Ean};
use crate::errors::CollectorResult;
use crate::providers::{skip_item, Emitter};
use crate::scheduler::Shutdown;

/// Describe one instance; `None` when it has no id
pub fn describe_instance(
    emitter: &Emitter,
    region: &str,
    owner_id: Option<&str>,
    instance: &Instance,
) -> Option<AssetBuilder> {
    let Some(id) = instance.instance_id.as_deref().filter(|id| !id.is_empty()) else {
        skip_item(AssetType::AwsEc2Instance, "InstanceId");
        return None;
    };

    let parents: Vec<Ean> = instance
        .subnet_id
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| Ean::network(s.as_str()))
        .collect();

    let mut builder = emitter
        .record(AssetType::AwsEc2Instance, id)
        .provider(CloudProvider::Aws)
        .region(region)
        .parents(parents)
        .tags(tag_map(&instance.tags));
    if let Some(owner) = owner_id {
        builder = builder.account(owner);
    }
    if let Some(state) = instance.state.as_ref().and_then(|s| s.name.as_deref()) {
        builder = builder.metadata_entry("state", state);
    }
    Some(builder)
}

/// Publish every instance in `region`
pub async fn collect_instances(
    api: &dyn AwsApi,
    emitter: &Emitter,
    region: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let reservations = shutdown.guard(api.describe_instances(region)).await?;
    debug!(region, reservations = reservations.len(), "described EC2 instances");

    let mut published = 0;
    for reservation in &reservations {
        for instance in &reservation.instances {
            if let Some(builder) =
                describe_instance(emitter, region, reservation.owner_id.as_deref(), instance)
            {
                emitter.emit(builder).await;
                published += 1;
            }
        }
    }
    Ok(published)
}
