// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Record and attribute patches
//!
//! A record is built by folding a sequence of [`AssetPatch`] values, left to
//! right, over an empty record. Patches touching different fields commute;
//! patches touching the same field are last-write-wins in the order given.
//! Metadata patches merge per flattened key.
//!
//! [`AssetBuilder`] is the fluent front end used by collectors: each setter
//! appends one patch, and [`AssetBuilder::build`] performs the fold.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::ean::Ean;
use super::metadata::{flatten, flatten_into, namespaced, FlatMetadata};
use super::taxonomy::{AssetKind, AssetType, CloudProvider};
use crate::destination::destination_for;

/// Normalized asset record
///
/// Immutable once built; handed to a sink exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub timestamp: DateTime<Utc>,
    pub provider: Option<CloudProvider>,
    pub region: Option<String>,
    pub account_id: Option<String>,
    pub kind: Option<AssetKind>,
    pub id: Option<String>,
    pub ean: Option<Ean>,
    pub asset_type: Option<AssetType>,
    pub name: Option<String>,
    pub parents: Vec<Ean>,
    pub children: Vec<Ean>,
    /// Flattened metadata, emitted under `asset.metadata.*`
    pub metadata: FlatMetadata,
    /// Extra top-level document fields (`cloud.instance.id`, `kubernetes.*`)
    pub fields: FlatMetadata,
    /// Logical stream this record is routed to
    pub destination: Option<String>,
}

impl AssetRecord {
    /// A fresh record with no attributes set
    pub fn empty() -> Self {
        Self {
            timestamp: Utc::now(),
            provider: None,
            region: None,
            account_id: None,
            kind: None,
            id: None,
            ean: None,
            asset_type: None,
            name: None,
            parents: Vec::new(),
            children: Vec::new(),
            metadata: FlatMetadata::new(),
            fields: FlatMetadata::new(),
            destination: None,
        }
    }

    /// Fold `patches` left to right over an empty record
    pub fn compose<I>(patches: I) -> Self
    where
        I: IntoIterator<Item = AssetPatch>,
    {
        patches
            .into_iter()
            .fold(Self::empty(), |record, patch| patch.apply(record))
    }

    pub fn builder() -> AssetBuilder {
        AssetBuilder::default()
    }

    /// The flat document emitted downstream.
    ///
    /// Unset optional fields are omitted, as are empty parent and child
    /// lists.
    pub fn document(&self) -> BTreeMap<String, Value> {
        let mut doc = BTreeMap::new();
        doc.insert(
            "@timestamp".to_string(),
            Value::String(self.timestamp.to_rfc3339()),
        );

        let mut put = |key: &str, value: Option<&str>| {
            if let Some(v) = value {
                doc.insert(key.to_string(), Value::String(v.to_string()));
            }
        };
        put("cloud.provider", self.provider.as_ref().map(CloudProvider::as_str));
        put("cloud.region", self.region.as_deref());
        put("cloud.account.id", self.account_id.as_deref());
        put("asset.kind", self.kind.as_ref().map(AssetKind::as_str));
        put("asset.id", self.id.as_deref());
        put("asset.type", self.asset_type.as_ref().map(AssetType::as_str));
        put("asset.name", self.name.as_deref());

        if let Some(ean) = &self.ean {
            doc.insert("asset.ean".to_string(), Value::String(ean.to_string()));
        }
        if !self.parents.is_empty() {
            doc.insert("asset.parents".to_string(), ean_list(&self.parents));
        }
        if !self.children.is_empty() {
            doc.insert("asset.children".to_string(), ean_list(&self.children));
        }
        for (key, value) in &self.metadata {
            doc.insert(format!("asset.metadata.{key}"), value.clone());
        }
        for (key, value) in &self.fields {
            doc.insert(key.clone(), value.clone());
        }
        doc
    }
}

fn ean_list(eans: &[Ean]) -> Value {
    Value::Array(eans.iter().map(|e| Value::String(e.to_string())).collect())
}

impl Serialize for AssetRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document().serialize(serializer)
    }
}

/// One attribute setter
#[derive(Debug, Clone, PartialEq)]
pub enum AssetPatch {
    Provider(CloudProvider),
    Region(String),
    Account(String),
    /// Sets kind and id, and derives the EAN from both
    KindAndId(AssetKind, String),
    Type(AssetType),
    Name(String),
    Parents(Vec<Ean>),
    Children(Vec<Ean>),
    /// Nested metadata, flattened on application
    Metadata(Map<String, Value>),
    /// Provider tags, stored under `metadata.tags.*`
    Tags(BTreeMap<String, String>),
    /// Provider labels, stored under `metadata.labels.*`
    Labels(BTreeMap<String, String>),
    /// A top-level document field
    Field(String, Value),
    Destination(String),
}

impl AssetPatch {
    /// Apply this patch, producing the next record
    pub fn apply(self, mut record: AssetRecord) -> AssetRecord {
        match self {
            Self::Provider(p) => record.provider = Some(p),
            Self::Region(r) => record.region = Some(r),
            Self::Account(a) => record.account_id = Some(a),
            Self::KindAndId(kind, id) => {
                record.ean = Some(Ean::new(kind, id.clone()));
                record.kind = Some(kind);
                record.id = Some(id);
            }
            Self::Type(t) => record.asset_type = Some(t),
            Self::Name(n) => record.name = Some(n),
            Self::Parents(p) => record.parents = p,
            Self::Children(c) => record.children = c,
            Self::Metadata(map) => record.metadata.extend(flatten(&map)),
            Self::Tags(tags) => record.metadata.extend(namespaced("tags", &tags)),
            Self::Labels(labels) => record.metadata.extend(namespaced("labels", &labels)),
            Self::Field(key, value) => flatten_into(&key, &value, &mut record.fields),
            Self::Destination(d) => record.destination = Some(d),
        }
        record
    }
}

/// Fluent record builder
#[derive(Debug, Clone, Default)]
pub struct AssetBuilder {
    patches: Vec<AssetPatch>,
}

impl AssetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary patch
    pub fn patch(mut self, patch: AssetPatch) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn provider(self, provider: CloudProvider) -> Self {
        self.patch(AssetPatch::Provider(provider))
    }

    pub fn region(self, region: impl Into<String>) -> Self {
        self.patch(AssetPatch::Region(region.into()))
    }

    pub fn account(self, account_id: impl Into<String>) -> Self {
        self.patch(AssetPatch::Account(account_id.into()))
    }

    pub fn kind_and_id(self, kind: AssetKind, id: impl Into<String>) -> Self {
        self.patch(AssetPatch::KindAndId(kind, id.into()))
    }

    /// Set the type, the kind and id it implies, and the destination
    pub fn typed(self, asset_type: AssetType, id: impl Into<String>, namespace: Option<&str>) -> Self {
        self.kind_and_id(asset_type.kind(), id)
            .asset_type(asset_type)
            .destination(destination_for(asset_type, namespace))
    }

    pub fn asset_type(self, asset_type: AssetType) -> Self {
        self.patch(AssetPatch::Type(asset_type))
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.patch(AssetPatch::Name(name.into()))
    }

    /// Skips the patch when the name is empty
    pub fn maybe_name(self, name: Option<impl Into<String>>) -> Self {
        match name.map(Into::into) {
            Some(n) if !n.is_empty() => self.name(n),
            _ => self,
        }
    }

    pub fn parents(self, parents: Vec<Ean>) -> Self {
        self.patch(AssetPatch::Parents(parents))
    }

    pub fn children(self, children: Vec<Ean>) -> Self {
        self.patch(AssetPatch::Children(children))
    }

    pub fn metadata(self, metadata: Map<String, Value>) -> Self {
        self.patch(AssetPatch::Metadata(metadata))
    }

    /// Single metadata entry; `key` may itself be dotted
    pub fn metadata_entry(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = Map::new();
        map.insert(key.into(), value.into());
        self.metadata(map)
    }

    pub fn tags(self, tags: BTreeMap<String, String>) -> Self {
        self.patch(AssetPatch::Tags(tags))
    }

    pub fn labels(self, labels: BTreeMap<String, String>) -> Self {
        self.patch(AssetPatch::Labels(labels))
    }

    pub fn field(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.patch(AssetPatch::Field(key.into(), value.into()))
    }

    pub fn cloud_instance_id(self, instance_id: impl Into<String>) -> Self {
        self.field("cloud.instance.id", instance_id.into())
    }

    pub fn node_data(self, name: impl Into<String>, start_time: Option<DateTime<Utc>>) -> Self {
        self.field("kubernetes.node.name", name.into())
            .field("kubernetes.node.start_time", time_value(start_time))
    }

    pub fn pod_data(
        self,
        name: impl Into<String>,
        uid: impl Into<String>,
        namespace: impl Into<String>,
        start_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.field("kubernetes.pod.name", name.into())
            .field("kubernetes.pod.uid", uid.into())
            .field("kubernetes.pod.start_time", time_value(start_time))
            .field("kubernetes.namespace", namespace.into())
    }

    pub fn container_data(
        self,
        name: impl Into<String>,
        uid: impl Into<String>,
        namespace: impl Into<String>,
        state: impl Into<String>,
        start_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.field("kubernetes.container.name", name.into())
            .field("kubernetes.container.uid", uid.into())
            .field("kubernetes.container.start_time", time_value(start_time))
            .field("kubernetes.container.state", state.into())
            .field("kubernetes.namespace", namespace.into())
    }

    pub fn destination(self, destination: impl Into<String>) -> Self {
        self.patch(AssetPatch::Destination(destination.into()))
    }

    /// Patches accumulated so far
    pub fn patches(&self) -> &[AssetPatch] {
        &self.patches
    }

    /// Fold every patch over an empty record
    pub fn build(self) -> AssetRecord {
        AssetRecord::compose(self.patches)
    }
}

fn time_value(t: Option<DateTime<Utc>>) -> Value {
    t.map(|t| Value::String(t.to_rfc3339())).unwrap_or(Value::Null)
}
