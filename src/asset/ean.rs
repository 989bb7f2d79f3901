// Copyright (c) 2025 - Cowboy AI, Inc.
//! Entity Address Name
//!
//! An EAN is the stable cross-reference identifier of an asset, written as
//! `kind:id`. Two records describing the same resource always carry the
//! same EAN; parent and child edges are lists of EANs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::taxonomy::AssetKind;

/// Stable asset identifier (`kind:id`)
///
/// The separator is not escaped. Ids containing `:` still round-trip
/// because parsing splits on the first separator only, and kinds never
/// contain one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ean {
    kind: AssetKind,
    id: String,
}

/// Reasons an EAN string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EanError {
    #[error("EAN is missing the ':' separator")]
    MissingSeparator,

    #[error("Unknown asset kind: {0}")]
    UnknownKind(String),

    #[error("EAN id cannot be empty")]
    EmptyId,
}

impl Ean {
    /// Build an EAN from a kind and a provider-assigned id
    pub fn new(kind: AssetKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn host(id: impl Into<String>) -> Self {
        Self::new(AssetKind::Host, id)
    }

    pub fn network(id: impl Into<String>) -> Self {
        Self::new(AssetKind::Network, id)
    }

    pub fn cluster(id: impl Into<String>) -> Self {
        Self::new(AssetKind::Cluster, id)
    }

    pub fn container_group(id: impl Into<String>) -> Self {
        Self::new(AssetKind::ContainerGroup, id)
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Ean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for Ean {
    type Err = EanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or(EanError::MissingSeparator)?;
        let kind = AssetKind::parse(kind).ok_or_else(|| EanError::UnknownKind(kind.to_string()))?;
        if id.is_empty() {
            return Err(EanError::EmptyId);
        }
        Ok(Self::new(kind, id))
    }
}

impl TryFrom<String> for Ean {
    type Error = EanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ean> for String {
    fn from(ean: Ean) -> Self {
        ean.to_string()
    }
}
