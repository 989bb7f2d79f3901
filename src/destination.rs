// Copyright (c) 2025 - Cowboy AI, Inc.

//! Destination routing strings
//!
//! Every record carries a logical stream name derived from its asset type
//! and the configured namespace:
//!
//! ```text
//! assets-{type}-{namespace}
//! ```
//!
//! The NATS sink publishes to a subject equal to this string.
//!
//! # Examples
//!
//! ```rust
//! use cim_asset_collector::asset::AssetType;
//! use cim_asset_collector::destination::destination_for;
//!
//! assert_eq!(
//!     destination_for(AssetType::AwsVpc, None),
//!     "assets-aws.vpc-default"
//! );
//! assert_eq!(
//!     destination_for(AssetType::K8sPod, Some("prod")),
//!     "assets-k8s.pod-prod"
//! );
//! ```

use crate::asset::AssetType;

/// Index type prefix shared by all asset destinations
pub const INDEX_TYPE: &str = "assets";

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "default";

/// Build the destination for `asset_type` under `namespace`.
///
/// An absent or empty namespace falls back to [`DEFAULT_NAMESPACE`].
pub fn destination_for(asset_type: AssetType, namespace: Option<&str>) -> String {
    let namespace = match namespace {
        Some(ns) if !ns.is_empty() => ns,
        _ => DEFAULT_NAMESPACE,
    };
    format!("{INDEX_TYPE}-{asset_type}-{namespace}")
}
