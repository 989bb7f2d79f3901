// Copyright (c) 2025 - Cowboy AI, Inc.
//! Collector configuration
//!
//! Loaded from a TOML file. Each provider section is optional; a missing
//! section disables that provider.
//!
//! ```toml
//! [nats]
//! servers = ["nats://localhost:4222"]
//!
//! [aws]
//! period = 600
//! regions = ["eu-west-1"]
//! asset_types = ["aws.ec2.instance", "aws.subnet"]
//!
//! [gcp]
//! projects = ["my-project"]
//! index_namespace = "prod"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::asset::{AssetType, CloudProvider};
use crate::errors::{CollectorError, CollectorResult};
use crate::nats::NatsConfig;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "ASSET_COLLECTOR_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "asset-collector.toml";

/// Environment override for the NATS server list (comma separated)
pub const NATS_URL_ENV: &str = "NATS_URL";

/// Default poll period in seconds
pub const DEFAULT_PERIOD_SECS: u64 = 600;

fn default_period() -> u64 {
    DEFAULT_PERIOD_SECS
}

/// Settings shared by every provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Poll period in seconds; also half the cross-reference TTL
    #[serde(default = "default_period")]
    pub period: u64,

    /// Enabled asset types; empty means all
    #[serde(default)]
    pub asset_types: Vec<String>,

    /// Destination namespace override
    #[serde(default)]
    pub index_namespace: Option<String>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD_SECS,
            asset_types: Vec::new(),
            index_namespace: None,
        }
    }
}

impl BaseConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period)
    }

    /// TTL for cross-reference cache entries: two poll periods
    pub fn cache_ttl(&self) -> Duration {
        self.period() * 2
    }

    /// Empty allow-list enables everything
    pub fn is_type_enabled(&self, asset_type: AssetType) -> bool {
        self.asset_types.is_empty() || self.asset_types.iter().any(|t| t == asset_type.as_str())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.index_namespace.as_deref()
    }

    fn validate(&self, provider: CloudProvider) -> CollectorResult<()> {
        if self.period == 0 {
            return Err(CollectorError::Configuration(format!(
                "{provider}: period must be greater than zero"
            )));
        }

        for name in &self.asset_types {
            let known = AssetType::parse(name)
                .is_some_and(|t| provider.asset_types().contains(&t));
            if !known {
                return Err(CollectorError::Configuration(format!(
                    "{provider}: unknown asset type '{name}'"
                )));
            }
        }

        if let Some(ns) = &self.index_namespace {
            if ns.is_empty() || ns.chars().any(char::is_whitespace) {
                return Err(CollectorError::Configuration(format!(
                    "{provider}: index_namespace '{ns}' must be non-empty without whitespace"
                )));
            }
        }
        Ok(())
    }
}

fn default_aws_regions() -> Vec<String> {
    vec!["eu-west-2".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default = "default_aws_regions")]
    pub regions: Vec<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            regions: default_aws_regions(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default)]
    pub projects: Vec<String>,
    /// Empty means every region
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub credentials_file_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    /// Empty means every region
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// When unset, subscriptions are listed through the API
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub resource_group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct K8sConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default)]
    pub kube_config: Option<String>,
    /// Running inside the cluster (enables the GKE cluster parent lookup)
    #[serde(default)]
    pub in_cluster: bool,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub aws: Option<AwsConfig>,
    #[serde(default)]
    pub gcp: Option<GcpConfig>,
    #[serde(default)]
    pub azure: Option<AzureConfig>,
    #[serde(default)]
    pub k8s: Option<K8sConfig>,
}

impl CollectorConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> CollectorResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn from_path(path: impl AsRef<Path>) -> CollectorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CollectorError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from `ASSET_COLLECTOR_CONFIG` (or the default path), then apply
    /// environment overrides
    pub fn load() -> CollectorResult<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_path(&path)?;
        if let Ok(url) = std::env::var(NATS_URL_ENV) {
            config.apply_nats_url(&url);
        }
        Ok(config)
    }

    /// Replace the NATS server list with a comma separated override
    pub fn apply_nats_url(&mut self, urls: &str) {
        let servers: Vec<String> = urls
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if !servers.is_empty() {
            self.nats.servers = servers;
        }
    }

    /// Reject configurations no collector could run with
    pub fn validate(&self) -> CollectorResult<()> {
        if let Some(aws) = &self.aws {
            aws.base.validate(CloudProvider::Aws)?;
        }
        if let Some(gcp) = &self.gcp {
            gcp.base.validate(CloudProvider::Gcp)?;
            if gcp.projects.is_empty() {
                return Err(CollectorError::Configuration(
                    "gcp: at least one project is required".to_string(),
                ));
            }
        }
        if let Some(azure) = &self.azure {
            azure.base.validate(CloudProvider::Azure)?;
        }
        if let Some(k8s) = &self.k8s {
            k8s.base.validate(CloudProvider::K8s)?;
        }
        if self.nats.enabled && self.nats.servers.is_empty() {
            return Err(CollectorError::Configuration(
                "nats: enabled without servers".to_string(),
            ));
        }
        Ok(())
    }

    /// Providers with a config section
    pub fn enabled_providers(&self) -> Vec<CloudProvider> {
        let mut providers = Vec::new();
        if self.aws.is_some() {
            providers.push(CloudProvider::Aws);
        }
        if self.gcp.is_some() {
            providers.push(CloudProvider::Gcp);
        }
        if self.azure.is_some() {
            providers.push(CloudProvider::Azure);
        }
        if self.k8s.is_some() {
            providers.push(CloudProvider::K8s);
        }
        providers
    }
}
