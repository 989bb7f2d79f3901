// Copyright (c) 2025 - Cowboy AI, Inc.
//! GCE instance metadata server client

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::errors::{CollectorError, CollectorResult};

pub const METADATA_URL: &str =
    "http://169.254.169.254/computeMetadata/v1/?recursive=true&alt=json";

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the local instance's metadata document
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn instance_metadata(&self) -> CollectorResult<Value>;
}

#[derive(Debug, Clone)]
pub struct GceMetadataClient {
    http: reqwest::Client,
    url: String,
}

impl GceMetadataClient {
    pub fn new() -> CollectorResult<Self> {
        Self::with_url(METADATA_URL)
    }

    pub fn with_url(url: impl Into<String>) -> CollectorResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MetadataFetcher for GceMetadataClient {
    async fn instance_metadata(&self) -> CollectorResult<Value> {
        debug!(url = %self.url, "fetching instance metadata");
        let response = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::Metadata(format!(
                "metadata server returned {status}"
            )));
        }
        Ok(response.json().await?)
    }
}

/// GKE cluster uid from the metadata document
pub fn cluster_uid(metadata: &Value) -> Option<&str> {
    metadata
        .pointer("/instance/attributes/cluster-uid")
        .and_then(Value::as_str)
        .filter(|uid| !uid.is_empty())
}
