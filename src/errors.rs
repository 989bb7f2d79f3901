// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for asset collection

use thiserror::Error;

use crate::state_machine::TransitionError;

/// Errors that can occur while collecting and publishing assets
#[derive(Debug, Error)]
pub enum CollectorError {
    /// A provider API call failed; the resource type is skipped for this pass
    #[error("{provider} API error during {operation}: {message}")]
    Provider {
        provider: &'static str,
        operation: String,
        message: String,
    },

    /// A single listed item could not be described
    #[error("Invalid {asset_type} item: missing {field}")]
    InvalidItem {
        asset_type: &'static str,
        field: &'static str,
    },

    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Instance metadata server error
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Kubernetes watch stream error
    #[error("Watcher error: {0}")]
    Watcher(String),

    /// Scheduler lifecycle error
    #[error("Scheduler error: {0}")]
    Transition(#[from] TransitionError),

    /// A provider call was abandoned because shutdown was signalled
    #[error("Collection cancelled")]
    Cancelled,
}

impl CollectorError {
    /// Shorthand for a provider API failure
    pub fn provider(
        provider: &'static str,
        operation: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        CollectorError::Provider {
            provider,
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;

impl From<async_nats::Error> for CollectorError {
    fn from(err: async_nats::Error) -> Self {
        CollectorError::NatsConnection(err.to_string())
    }
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        CollectorError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        CollectorError::Metadata(err.to_string())
    }
}

impl From<toml::de::Error> for CollectorError {
    fn from(err: toml::de::Error) -> Self {
        CollectorError::Configuration(err.to_string())
    }
}
