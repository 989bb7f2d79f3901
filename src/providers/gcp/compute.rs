// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute Engine instances

use super::types::{region_from_zone, want_zone, ComputeInstance};
use super::GcpContext;
use crate::asset::{AssetKind, AssetType, CloudProvider};
use crate::correlate::{resolve_links, InstanceSummary};
use crate::errors::CollectorResult;
use crate::providers::{skip_item, ScopeTally};
use crate::scheduler::Shutdown;

/// Instances of one zone as cache summaries; instances without an id are dropped
pub fn summaries(
    project: &str,
    zone: &str,
    instances: &[ComputeInstance],
) -> Vec<InstanceSummary> {
    let region = region_from_zone(zone);
    instances
        .iter()
        .filter_map(|i| {
            let id = i.id.clone().filter(|id| !id.is_empty())?;
            Some(InstanceSummary {
                id,
                region: region.clone(),
                account: project.to_string(),
                metadata_items: i.metadata.items.clone(),
            })
        })
        .collect()
}

async fn publish_instance(
    ctx: &GcpContext,
    project: &str,
    zone: &str,
    instance: &ComputeInstance,
) -> bool {
    let Some(id) = instance.id.as_deref().filter(|id| !id.is_empty()) else {
        skip_item(AssetType::GcpComputeInstance, "id");
        return false;
    };
    let region = region_from_zone(zone);

    if let Some(link) = instance.self_link.as_deref().filter(|l| !l.is_empty()) {
        let summary = InstanceSummary {
            id: id.to_string(),
            region: region.clone(),
            account: project.to_string(),
            metadata_items: instance.metadata.items.clone(),
        };
        ctx.caches.instances.put(link, summary, ctx.caches.ttl);
    }

    let parents = resolve_links(
        &ctx.caches.subnets,
        instance
            .network_interfaces
            .iter()
            .filter_map(|nic| nic.subnetwork.as_deref()),
        AssetKind::Network,
    );

    let mut builder = ctx
        .emitter
        .record(AssetType::GcpComputeInstance, id)
        .provider(CloudProvider::Gcp)
        .region(region)
        .account(project)
        .maybe_name(instance.name.as_deref())
        .parents(parents)
        .labels(instance.labels.clone());
    if let Some(status) = &instance.status {
        builder = builder.metadata_entry("state", status.as_str());
    }
    ctx.emitter.emit(builder).await;
    true
}

async fn instances_of(
    ctx: &GcpContext,
    project: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let scopes = shutdown
        .guard(ctx.api.aggregated_list_instances(project, None))
        .await?;
    let mut published = 0;
    for scope in &scopes {
        if !want_zone(&scope.zone, &ctx.regions) {
            continue;
        }
        for instance in &scope.instances {
            if publish_instance(ctx, project, &scope.zone, instance).await {
                published += 1;
            }
        }
    }
    Ok(published)
}

/// Publish instances in the wanted regions and record each in the instance
/// cache; NIC subnetworks resolve through the subnet cache
pub async fn collect_instances(ctx: &GcpContext, shutdown: &Shutdown) -> CollectorResult<usize> {
    let mut tally = ScopeTally::default();
    for project in &ctx.projects {
        let outcome = instances_of(ctx, project, shutdown).await;
        tally.record(project, AssetType::GcpComputeInstance, outcome);
    }
    tally.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Ean;
    use crate::correlate::MetadataItem;
    use crate::providers::gcp::fake::{context, FakeGcp};
    use crate::providers::gcp::types::{InstanceMetadata, NetworkInterface, ZoneInstances};
    use crate::providers::gcp::SubnetSummary;
    use crate::sink::InMemorySink;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    const SUBNET_LINK: &str =
        "https://www.googleapis.com/compute/v1/projects/proj/regions/europe-west1/subnetworks/s";

    fn instance(id: &str, subnets: &[&str]) -> ComputeInstance {
        ComputeInstance {
            id: Some(id.into()),
            name: Some(format!("vm-{id}")),
            self_link: Some(format!("https://compute/instances/vm-{id}")),
            status: Some("RUNNING".into()),
            labels: [("env".to_string(), "prod".to_string())].into_iter().collect(),
            network_interfaces: subnets
                .iter()
                .map(|s| NetworkInterface {
                    subnetwork: Some(s.to_string()),
                })
                .collect(),
            metadata: InstanceMetadata {
                items: vec![MetadataItem::new(
                    "kube-labels",
                    "cloud.google.com/gke-nodepool=np1",
                )],
            },
        }
    }

    fn api(zone: &str, instances: Vec<ComputeInstance>) -> FakeGcp {
        let mut api = FakeGcp::default();
        api.instances.insert(
            "proj".into(),
            vec![ZoneInstances {
                zone: zone.into(),
                instances,
            }],
        );
        api
    }

    #[tokio::test]
    async fn test_instance_record_and_cache() {
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(
            api("zones/europe-west1-d", vec![instance("123", &[SUBNET_LINK])]),
            sink.clone(),
            &[],
        );
        ctx.caches.subnets.put(
            SUBNET_LINK,
            SubnetSummary {
                id: "2".into(),
                name: "s".into(),
                account: "proj".into(),
                region: "europe-west1".into(),
            },
            ctx.caches.ttl,
        );

        assert_eq!(collect_instances(&ctx, &Shutdown::never()).await.unwrap(), 1);
        let record = sink.find(&Ean::host("123")).unwrap();
        assert_eq!(record.region.as_deref(), Some("europe-west1"));
        assert_eq!(record.parents, vec![Ean::network("2")]);
        assert_eq!(record.metadata["state"], json!("RUNNING"));
        assert_eq!(record.metadata["labels.env"], json!("prod"));

        let cached = ctx.caches.instances.get("https://compute/instances/vm-123").unwrap();
        assert_eq!(cached.region, "europe-west1");
        assert_eq!(cached.metadata_items.len(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_subnet_is_dropped() {
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(
            api("zones/europe-west1-d", vec![instance("123", &[SUBNET_LINK, ""])]),
            sink.clone(),
            &[],
        );

        assert_eq!(collect_instances(&ctx, &Shutdown::never()).await.unwrap(), 1);
        assert!(sink.find(&Ean::host("123")).unwrap().parents.is_empty());
    }

    #[tokio::test]
    async fn test_zone_filter() {
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(
            api("zones/us-east1-b", vec![instance("9", &[])]),
            sink.clone(),
            &["europe-west1"],
        );

        assert_eq!(collect_instances(&ctx, &Shutdown::never()).await.unwrap(), 0);
        assert!(ctx.caches.instances.is_empty());
    }

    #[test]
    fn test_summaries_skip_missing_ids() {
        let mut no_id = instance("1", &[]);
        no_id.id = None;
        let list = summaries("proj", "zones/europe-west1-d", &[no_id, instance("2", &[])]);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].region, "europe-west1");
    }
}
