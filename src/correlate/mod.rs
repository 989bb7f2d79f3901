// Copyright (c) 2025 - Cowboy AI, Inc.
//! Correlation algorithms
//!
//! Parent and child edges between independently collected assets are
//! computed here. Every function is best-effort: a miss yields no edge,
//! never an error that drops the record.

pub mod link;
pub mod node_pool;

pub use link::{resolve_link, resolve_links};
pub use node_pool::{
    cluster_instance_ids, is_member, kube_labels, InstanceSummary, MetadataItem, KUBE_LABELS_KEY,
    NODE_POOL_LABEL,
};
