// Copyright (c) 2025 - Cowboy AI, Inc.
//! End-to-end collection scenarios
//!
//! Each scenario builds a collector over a snapshot directory, runs the
//! tasks of one pass to completion and inspects what reached the sink.

mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use cim_asset_collector::correlate::{InstanceSummary, MetadataItem};
use cim_asset_collector::providers::aws::AwsCollector;
use cim_asset_collector::providers::azure::AzureCollector;
use cim_asset_collector::providers::gcp::GcpCollector;
use cim_asset_collector::providers::k8s::K8sCollector;
use cim_asset_collector::{
    run_all, shutdown_channel, AssetKind, AssetType, CloudProvider, Collector, Ean, InMemorySink,
    Shutdown,
};

/// Await every task of one pass, in order
async fn run_pass(collector: &dyn Collector) -> Vec<(AssetType, bool)> {
    let mut outcomes = Vec::new();
    for task in collector.pass(&Shutdown::never()) {
        let ok = task.work.await.is_ok();
        outcomes.push((task.asset_type, ok));
    }
    outcomes
}

fn gke_member(id: &str, region: &str, pool: &str) -> InstanceSummary {
    InstanceSummary {
        id: id.to_string(),
        region: region.to_string(),
        account: GCP_PROJECT.to_string(),
        metadata_items: vec![MetadataItem::new(
            "kube-labels",
            format!("cloud.google.com/gke-nodepool={pool},env=prod"),
        )],
    }
}

#[tokio::test]
async fn test_ec2_instance_with_known_subnet() {
    let snapshot = ec2_snapshot();
    let sink = Arc::new(InMemorySink::new());
    let collector = AwsCollector::new(
        aws_config(&["aws.ec2.instance"]),
        snapshot.source(),
        sink.clone(),
    );

    assert_eq!(run_pass(&collector).await, vec![(AssetType::AwsEc2Instance, true)]);

    let record = sink.find(&Ean::host(EC2_INSTANCE_ID)).expect("instance published");
    assert_eq!(record.kind, Some(AssetKind::Host));
    assert_eq!(record.id.as_deref(), Some(EC2_INSTANCE_ID));
    assert_eq!(record.parents, vec![Ean::network(AWS_SUBNET_ID)]);
    assert_eq!(record.region.as_deref(), Some(AWS_REGION));
    assert_eq!(record.account_id.as_deref(), Some(AWS_OWNER));
    assert_eq!(record.metadata["tags.team"], json!("x"));

    let doc = record.document();
    assert_eq!(doc["asset.ean"], json!(format!("host:{EC2_INSTANCE_ID}")));
    assert_eq!(doc["asset.parents"], json!(["network:subnet-1"]));
    assert_eq!(record.destination.as_deref(), Some("assets-aws.ec2.instance-default"));
}

#[tokio::test]
async fn test_gke_cluster_children_from_same_region_pool() {
    let snapshot = gke_snapshot();
    let sink = Arc::new(InMemorySink::new());
    let collector = GcpCollector::new(gcp_config(&["k8s.cluster"]), snapshot.source(), sink.clone());
    let ttl = collector.caches().ttl;
    collector
        .caches()
        .instances
        .put("link/42", gke_member("42", GCP_REGION, "np1"), ttl);
    collector
        .caches()
        .instances
        .put("link/43", gke_member("43", "us-east1", "np1"), ttl);
    collector
        .caches()
        .instances
        .put("link/44", gke_member("44", GCP_REGION, "np2"), ttl);

    run_pass(&collector).await;

    let record = sink.find(&Ean::cluster(GKE_CLUSTER_ID)).expect("cluster published");
    assert_eq!(record.children, vec![Ean::host("42")]);
    assert_eq!(record.provider, Some(CloudProvider::Gcp));
    assert_eq!(record.metadata["labels.env"], json!("prod"));
    assert!(record.parents.is_empty());
}

#[tokio::test]
async fn test_gke_cluster_without_members_has_no_children() {
    let snapshot = gke_snapshot();
    let sink = Arc::new(InMemorySink::new());
    let collector = GcpCollector::new(gcp_config(&["k8s.cluster"]), snapshot.source(), sink.clone());
    let ttl = collector.caches().ttl;
    collector
        .caches()
        .instances
        .put("link/43", gke_member("43", "us-east1", "np1"), ttl);

    run_pass(&collector).await;

    let record = sink.find(&Ean::cluster(GKE_CLUSTER_ID)).expect("cluster published");
    assert!(record.children.is_empty());
    assert!(!record.document().contains_key("asset.children"));
}

#[tokio::test]
async fn test_gke_cluster_published_when_instance_listing_fails() {
    // empty cache and no instances.json: the fallback listing errors
    let snapshot = gke_snapshot();
    let sink = Arc::new(InMemorySink::new());
    let collector = GcpCollector::new(gcp_config(&["k8s.cluster"]), snapshot.source(), sink.clone());

    assert_eq!(run_pass(&collector).await, vec![(AssetType::K8sCluster, true)]);
    let record = sink.find(&Ean::cluster(GKE_CLUSTER_ID)).expect("cluster published");
    assert!(record.children.is_empty());
}

#[tokio::test]
async fn test_subnet_with_uncached_vpc_is_still_published() {
    let snapshot = orphan_subnet_snapshot();
    let sink = Arc::new(InMemorySink::new());
    let collector = GcpCollector::new(gcp_config(&["gcp.subnet"]), snapshot.source(), sink.clone());

    run_pass(&collector).await;

    let record = sink.find(&Ean::network("7001")).expect("subnet published");
    assert!(record.parents.is_empty());
    assert_eq!(record.region.as_deref(), Some(GCP_REGION));
    assert!(!record.document().contains_key("asset.parents"));
}

#[tokio::test]
async fn test_vpc_pass_feeds_subnet_parents() {
    let snapshot = orphan_subnet_snapshot();
    snapshot.write(
        "gcp/proj-1/networks.json",
        r#"[{"id": 9001, "name": "never-seen",
             "selfLink": "https://www.googleapis.com/compute/v1/projects/proj-1/global/networks/never-seen"}]"#,
    );
    let sink = Arc::new(InMemorySink::new());
    let collector = GcpCollector::new(
        gcp_config(&["gcp.vpc", "gcp.subnet"]),
        snapshot.source(),
        sink.clone(),
    );

    // pass order is vpc before subnet
    run_pass(&collector).await;

    let subnet = sink.find(&Ean::network("7001")).expect("subnet published");
    assert_eq!(subnet.parents, vec![Ean::network("9001")]);
}

#[tokio::test]
async fn test_failing_type_does_not_block_sibling() {
    // instances.json present, vpcs.json and subnets.json missing
    let snapshot = ec2_snapshot();
    let sink = Arc::new(InMemorySink::new());
    let collector = AwsCollector::new(
        aws_config(&["aws.vpc", "aws.ec2.instance", "aws.subnet"]),
        snapshot.source(),
        sink.clone(),
    );

    let outcomes = run_pass(&collector).await;
    assert_eq!(outcomes.iter().filter(|(_, ok)| *ok).count(), 1);
    assert_eq!(sink.of_type(AssetType::AwsEc2Instance).len(), 1);
    assert!(sink.of_type(AssetType::AwsVpc).is_empty());
}

#[tokio::test]
async fn test_azure_vm_from_snapshot() {
    let snapshot = Snapshot::new();
    snapshot.write(
        "azure/sub-1/vms.json",
        r#"[{
            "id": "/subscriptions/sub-1/resourceGroups/web-rg/providers/Microsoft.Compute/virtualMachines/web-1",
            "name": "web-1",
            "location": "westeurope",
            "properties": {"vmId": "vm-uuid-1", "instanceView": {"statuses": [
                {"displayStatus": "Provisioning succeeded"},
                {"displayStatus": "VM running"}
            ]}}
        }]"#,
    );
    let sink = Arc::new(InMemorySink::new());
    let collector = AzureCollector::new(azure_config(&[]), snapshot.source(), sink.clone());

    run_pass(&collector).await;

    let record = sink.find(&Ean::host("vm-uuid-1")).expect("vm published");
    assert_eq!(record.account_id.as_deref(), Some(AZURE_SUBSCRIPTION));
    assert_eq!(record.metadata["resource_group"], json!("web-rg"));
    assert_eq!(record.metadata["state"], json!("VM running"));
}

#[tokio::test]
async fn test_k8s_pass_after_watchers_fill() {
    let snapshot = Snapshot::new();
    snapshot.write(
        "k8s/nodes.json",
        r#"[{"metadata": {"name": "node-a", "uid": "n-1"},
             "spec": {"providerID": "aws:///eu-west-1a/i-0abc"}}]"#,
    );
    snapshot.write(
        "k8s/pods.json",
        r#"[{"metadata": {"name": "web", "namespace": "default", "uid": "p-1"},
             "spec": {"nodeName": "node-a"},
             "status": {"containerStatuses": [{"name": "app", "containerID": "containerd://c-1",
                                               "state": {"running": {}}}]}}]"#,
    );
    let sink = Arc::new(InMemorySink::new());
    let collector = K8sCollector::new(k8s_config(&[]), snapshot.source(), sink.clone());
    let (_trigger, shutdown) = shutdown_channel();

    collector.start(&shutdown).await.expect("watchers start");
    for _ in 0..200 {
        if collector.context().nodes.len() == 1 && collector.context().pods.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    run_pass(&collector).await;
    collector.stop().await;

    let node = sink.find(&Ean::host("n-1")).expect("node published");
    assert_eq!(node.fields["cloud.instance.id"], json!("i-0abc"));
    let pod = sink.find(&Ean::container_group("p-1")).expect("pod published");
    assert_eq!(pod.parents, vec![Ean::host("n-1")]);
    let container = sink
        .find(&Ean::new(AssetKind::Container, "c-1"))
        .expect("container published");
    assert_eq!(container.parents, vec![Ean::container_group("p-1")]);
}

#[tokio::test(start_paused = true)]
async fn test_run_all_stops_on_cancellation() {
    let snapshot = ec2_snapshot();
    let sink = Arc::new(InMemorySink::new());
    let aws: Arc<dyn Collector> = Arc::new(AwsCollector::new(
        aws_config(&["aws.ec2.instance"]),
        snapshot.source(),
        sink.clone(),
    ));
    // no k8s files: this collector fails to start without affecting aws
    let k8s: Arc<dyn Collector> = Arc::new(K8sCollector::new(
        k8s_config(&[]),
        snapshot.source(),
        sink.clone(),
    ));
    let (trigger, shutdown) = shutdown_channel();

    let run = tokio::spawn(run_all(vec![aws, k8s], shutdown));
    tokio::time::sleep(Duration::from_secs(150)).await;
    trigger.cancel();
    let results = run.await.expect("run_all joined");

    let (provider, aws_result) = &results[0];
    assert_eq!(*provider, CloudProvider::Aws);
    assert_eq!(aws_result.as_ref().expect("aws ran").passes, 3);
    assert!(results[1].1.is_err());
}
