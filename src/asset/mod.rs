// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset domain model
//!
//! - [`taxonomy`]: providers, kinds, types
//! - [`ean`]: the `kind:id` cross-reference identifier
//! - [`metadata`]: dotted-key flattening
//! - [`record`]: the normalized record and its patch/builder API

pub mod ean;
pub mod metadata;
pub mod record;
pub mod taxonomy;

pub use ean::{Ean, EanError};
pub use metadata::{flatten, FlatMetadata};
pub use record::{AssetBuilder, AssetPatch, AssetRecord};
pub use taxonomy::{AssetKind, AssetType, CloudProvider};
