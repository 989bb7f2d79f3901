// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC networks and subnetworks

use super::types::{resource_name, want_region, Network, Subnetwork};
use super::{GcpContext, SubnetSummary, VpcSummary};
use crate::asset::{AssetKind, AssetType, CloudProvider};
use crate::correlate::resolve_link;
use crate::errors::CollectorResult;
use crate::providers::{skip_item, ScopeTally};
use crate::scheduler::Shutdown;

async fn publish_vpc(ctx: &GcpContext, project: &str, network: &Network) -> bool {
    let Some(id) = network.id.as_deref().filter(|id| !id.is_empty()) else {
        skip_item(AssetType::GcpVpc, "id");
        return false;
    };
    let name = network.name.clone().unwrap_or_default();

    if let Some(link) = network.self_link.as_deref().filter(|l| !l.is_empty()) {
        let summary = VpcSummary {
            id: id.to_string(),
            name: name.clone(),
            account: project.to_string(),
        };
        ctx.caches.vpcs.put(link, summary, ctx.caches.ttl);
    }

    let builder = ctx
        .emitter
        .record(AssetType::GcpVpc, id)
        .provider(CloudProvider::Gcp)
        .account(project)
        .maybe_name(Some(name));
    ctx.emitter.emit(builder).await;
    true
}

async fn vpcs_of(ctx: &GcpContext, project: &str, shutdown: &Shutdown) -> CollectorResult<usize> {
    let networks = shutdown.guard(ctx.api.list_networks(project)).await?;
    let mut published = 0;
    for network in &networks {
        if publish_vpc(ctx, project, network).await {
            published += 1;
        }
    }
    Ok(published)
}

/// Publish every VPC network and record it in the VPC cache
pub async fn collect_vpcs(ctx: &GcpContext, shutdown: &Shutdown) -> CollectorResult<usize> {
    let mut tally = ScopeTally::default();
    for project in &ctx.projects {
        let outcome = vpcs_of(ctx, project, shutdown).await;
        tally.record(project, AssetType::GcpVpc, outcome);
    }
    tally.finish()
}

async fn publish_subnet(ctx: &GcpContext, project: &str, subnet: &Subnetwork) -> bool {
    let Some(id) = subnet.id.as_deref().filter(|id| !id.is_empty()) else {
        skip_item(AssetType::GcpSubnet, "id");
        return false;
    };
    let region = subnet
        .region
        .as_deref()
        .map(resource_name)
        .unwrap_or_default()
        .to_string();
    let name = subnet.name.clone().unwrap_or_default();

    if let Some(link) = subnet.self_link.as_deref().filter(|l| !l.is_empty()) {
        let summary = SubnetSummary {
            id: id.to_string(),
            name: name.clone(),
            account: project.to_string(),
            region: region.clone(),
        };
        ctx.caches.subnets.put(link, summary, ctx.caches.ttl);
    }

    let parents = subnet
        .network
        .as_deref()
        .and_then(|link| resolve_link(&ctx.caches.vpcs, link, AssetKind::Network))
        .into_iter()
        .collect();

    let builder = ctx
        .emitter
        .record(AssetType::GcpSubnet, id)
        .provider(CloudProvider::Gcp)
        .account(project)
        .region(region)
        .maybe_name(Some(name))
        .parents(parents);
    ctx.emitter.emit(builder).await;
    true
}

async fn subnets_of(
    ctx: &GcpContext,
    project: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let subnets = shutdown.guard(ctx.api.list_subnetworks(project)).await?;
    let mut published = 0;
    for subnet in &subnets {
        let region = subnet.region.as_deref().unwrap_or_default();
        if !want_region(region, &ctx.regions) {
            continue;
        }
        if publish_subnet(ctx, project, subnet).await {
            published += 1;
        }
    }
    Ok(published)
}

/// Publish subnetworks in the wanted regions, parented to their VPC when
/// the VPC cache knows it
pub async fn collect_subnets(ctx: &GcpContext, shutdown: &Shutdown) -> CollectorResult<usize> {
    let mut tally = ScopeTally::default();
    for project in &ctx.projects {
        let outcome = subnets_of(ctx, project, shutdown).await;
        tally.record(project, AssetType::GcpSubnet, outcome);
    }
    tally.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Ean;
    use crate::providers::gcp::fake::{context, FakeGcp};
    use crate::sink::InMemorySink;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const NET_LINK: &str = "https://www.googleapis.com/compute/v1/projects/proj/global/networks/default";

    fn network() -> Network {
        Network {
            id: Some("1".into()),
            name: Some("default".into()),
            self_link: Some(NET_LINK.into()),
        }
    }

    fn subnet(id: &str, region: &str) -> Subnetwork {
        Subnetwork {
            id: Some(id.into()),
            name: Some(format!("sub-{id}")),
            self_link: Some(format!(
                "https://www.googleapis.com/compute/v1/projects/proj/regions/{region}/subnetworks/sub-{id}"
            )),
            network: Some(NET_LINK.into()),
            region: Some(format!(
                "https://www.googleapis.com/compute/v1/projects/proj/regions/{region}"
            )),
        }
    }

    #[tokio::test]
    async fn test_vpc_is_published_and_cached() {
        let mut api = FakeGcp::default();
        api.networks.insert("proj".into(), vec![network()]);
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(api, sink.clone(), &[]);

        assert_eq!(collect_vpcs(&ctx, &Shutdown::never()).await.unwrap(), 1);
        let record = sink.find(&Ean::network("1")).unwrap();
        assert_eq!(record.name.as_deref(), Some("default"));
        assert_eq!(record.account_id.as_deref(), Some("proj"));
        assert_eq!(ctx.caches.vpcs.resolve_id(NET_LINK).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_subnet_resolves_vpc_parent() {
        let mut api = FakeGcp::default();
        api.networks.insert("proj".into(), vec![network()]);
        api.subnetworks.insert("proj".into(), vec![subnet("2", "us-central1")]);
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(api, sink.clone(), &[]);

        collect_vpcs(&ctx, &Shutdown::never()).await.unwrap();
        assert_eq!(collect_subnets(&ctx, &Shutdown::never()).await.unwrap(), 1);

        let record = sink.find(&Ean::network("2")).unwrap();
        assert_eq!(record.parents, vec![Ean::network("1")]);
        assert_eq!(record.region.as_deref(), Some("us-central1"));
        assert_eq!(ctx.caches.subnets.len(), 1);
    }

    #[tokio::test]
    async fn test_subnet_without_cached_vpc_has_no_parent() {
        let mut api = FakeGcp::default();
        api.subnetworks.insert("proj".into(), vec![subnet("2", "us-central1")]);
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(api, sink.clone(), &[]);

        assert_eq!(collect_subnets(&ctx, &Shutdown::never()).await.unwrap(), 1);
        assert!(sink.find(&Ean::network("2")).unwrap().parents.is_empty());
    }

    #[tokio::test]
    async fn test_subnets_outside_regions_are_skipped() {
        let mut api = FakeGcp::default();
        api.subnetworks.insert(
            "proj".into(),
            vec![subnet("2", "us-central1"), subnet("3", "europe-west1")],
        );
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(api, sink.clone(), &["europe-west1"]);

        assert_eq!(collect_subnets(&ctx, &Shutdown::never()).await.unwrap(), 1);
        assert!(sink.find(&Ean::network("3")).is_some());
        assert!(sink.find(&Ean::network("2")).is_none());
    }
}
