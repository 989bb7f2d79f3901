// Copyright (c) 2025 - Cowboy AI, Inc.
//! Virtual machines

use super::types::VirtualMachine;
use super::AzureContext;
use crate::asset::{AssetType, CloudProvider};
use crate::errors::CollectorResult;
use crate::providers::{skip_item, wanted, Emitter, ScopeTally};
use crate::scheduler::Shutdown;

/// Does `vm` pass the region and resource-group filters?
pub fn want_vm(vm: &VirtualMachine, regions: &[String], resource_group: Option<&str>) -> bool {
    let region_ok = wanted(regions, vm.location.as_deref().unwrap_or_default());
    let group_ok = match resource_group.filter(|rg| !rg.is_empty()) {
        Some(rg) => vm.resource_group() == Some(rg),
        None => true,
    };
    region_ok && group_ok
}

async fn publish_vm(emitter: &Emitter, subscription: &str, vm: &VirtualMachine) -> bool {
    let Some(id) = vm.vm_id() else {
        skip_item(AssetType::AzureVmInstance, "vmId");
        return false;
    };
    let Some(resource_group) = vm.resource_group() else {
        skip_item(AssetType::AzureVmInstance, "id");
        return false;
    };

    let mut builder = emitter
        .record(AssetType::AzureVmInstance, id)
        .provider(CloudProvider::Azure)
        .account(subscription)
        .maybe_name(vm.name.as_deref())
        .tags(vm.tags.clone())
        .metadata_entry("resource_group", resource_group)
        .metadata_entry("state", vm.power_state().unwrap_or_default());
    if let Some(location) = &vm.location {
        builder = builder.region(location.as_str());
    }
    emitter.emit(builder).await;
    true
}

async fn vms_of(
    ctx: &AzureContext,
    subscription: &str,
    shutdown: &Shutdown,
) -> CollectorResult<usize> {
    let vms = shutdown.guard(ctx.api.list_vms(subscription)).await?;
    let mut published = 0;
    for vm in &vms {
        if !want_vm(vm, &ctx.regions, ctx.resource_group.as_deref()) {
            continue;
        }
        if publish_vm(&ctx.emitter, subscription, vm).await {
            published += 1;
        }
    }
    Ok(published)
}

/// Publish the wanted VMs of every subscription
pub async fn collect_vms(ctx: &AzureContext, shutdown: &Shutdown) -> CollectorResult<usize> {
    let subscriptions = shutdown.guard(ctx.subscriptions()).await?;
    let mut tally = ScopeTally::default();
    for subscription in &subscriptions {
        let outcome = vms_of(ctx, subscription, shutdown).await;
        tally.record(subscription, AssetType::AzureVmInstance, outcome);
    }
    tally.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Ean;
    use crate::errors::CollectorError;
    use crate::providers::azure::fake::{context, FakeAzure};
    use crate::providers::azure::types::{InstanceView, InstanceViewStatus, VmProperties};
    use crate::sink::InMemorySink;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn vm(vm_id: &str, location: &str, group: &str) -> VirtualMachine {
        VirtualMachine {
            id: Some(format!(
                "/subscriptions/sub-1/resourceGroups/{group}/providers/Microsoft.Compute/virtualMachines/{vm_id}"
            )),
            name: Some(format!("vm-{vm_id}")),
            location: Some(location.into()),
            tags: [("env".to_string(), "prod".to_string())].into_iter().collect(),
            properties: Some(VmProperties {
                vm_id: Some(vm_id.into()),
                instance_view: Some(InstanceView {
                    statuses: vec![
                        InstanceViewStatus::default(),
                        InstanceViewStatus {
                            code: Some("PowerState/running".into()),
                            display_status: Some("VM running".into()),
                        },
                    ],
                }),
            }),
        }
    }

    #[tokio::test]
    async fn test_vm_record() {
        let mut api = FakeAzure::default();
        api.vms.insert("sub-1".into(), vec![vm("a", "westeurope", "rg")]);
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(Arc::new(api), sink.clone(), Some("sub-1"));

        assert_eq!(collect_vms(&ctx, &Shutdown::never()).await.unwrap(), 1);
        let record = sink.find(&Ean::host("a")).unwrap();
        assert_eq!(record.provider, Some(CloudProvider::Azure));
        assert_eq!(record.region.as_deref(), Some("westeurope"));
        assert_eq!(record.account_id.as_deref(), Some("sub-1"));
        assert_eq!(record.name.as_deref(), Some("vm-a"));
        assert_eq!(record.metadata["state"], json!("VM running"));
        assert_eq!(record.metadata["resource_group"], json!("rg"));
        assert_eq!(record.metadata["tags.env"], json!("prod"));
    }

    #[tokio::test]
    async fn test_region_and_group_filters() {
        let mut api = FakeAzure::default();
        api.vms.insert(
            "sub-1".into(),
            vec![
                vm("a", "westeurope", "rg"),
                vm("b", "eastus", "rg"),
                vm("c", "westeurope", "other"),
            ],
        );
        let sink = Arc::new(InMemorySink::new());
        let mut ctx = context(Arc::new(api), sink.clone(), Some("sub-1"));
        ctx.regions = vec!["westeurope".into()];
        ctx.resource_group = Some("rg".into());

        assert_eq!(collect_vms(&ctx, &Shutdown::never()).await.unwrap(), 1);
        assert!(sink.find(&Ean::host("a")).is_some());
    }

    #[tokio::test]
    async fn test_failing_subscription_does_not_stop_others() {
        let mut api = FakeAzure {
            subscriptions: vec!["bad".into(), "sub-1".into()],
            failing_subscriptions: vec!["bad"],
            ..FakeAzure::default()
        };
        api.vms.insert("sub-1".into(), vec![vm("a", "westeurope", "rg")]);
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(Arc::new(api), sink.clone(), None);

        assert_eq!(collect_vms(&ctx, &Shutdown::never()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_vm_without_id_is_skipped() {
        let mut broken = vm("x", "westeurope", "rg");
        broken.properties = None;
        let mut api = FakeAzure::default();
        api.vms.insert("sub-1".into(), vec![broken]);
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(Arc::new(api), sink.clone(), Some("sub-1"));

        assert_eq!(collect_vms(&ctx, &Shutdown::never()).await.unwrap(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_listing_publishes_nothing() {
        let mut api = FakeAzure::default();
        api.vms.insert("sub-1".into(), vec![vm("a", "westeurope", "rg")]);
        let sink = Arc::new(InMemorySink::new());
        let ctx = context(Arc::new(api), sink.clone(), Some("sub-1"));
        let (trigger, shutdown) = crate::scheduler::shutdown_channel();
        trigger.cancel();

        let err = collect_vms(&ctx, &shutdown).await.unwrap_err();
        assert!(matches!(err, CollectorError::Cancelled));
        assert!(sink.is_empty());
    }
}
