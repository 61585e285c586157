//! Configuration types for the contract layer.
//!
//! This module provides the options shared by the universal adapter and the
//! conformance checks, using the builder pattern for ergonomic setup.

use crate::params::validate_segment;
use serde::{Deserialize, Serialize};

/// Default path segment the adapter re-exports wrapped parameters under.
pub const DEFAULT_ADAPTER_PREFIX: &str = "obj";

/// Configuration for adapters and conformance checks.
///
/// Use [`ContractConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_stages::config::ContractConfig;
///
/// let config = ContractConfig::builder()
///     .adapter_prefix("model")
///     .verify_lineage(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Single path segment that prefixes every parameter re-exported by a
    /// [`UniversalAdapter`](crate::UniversalAdapter).
    /// Default: "obj"
    pub adapter_prefix: String,

    /// Whether conformance checks validate lineage records of shape-changing stages.
    /// Default: true
    pub verify_lineage: bool,

    /// Whether conformance checks compare transform output against `feature_names_out`.
    /// Default: true
    pub verify_feature_names: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            adapter_prefix: DEFAULT_ADAPTER_PREFIX.to_string(),
            verify_lineage: true,
            verify_feature_names: true,
        }
    }
}

impl ContractConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ContractConfigBuilder {
        ContractConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Err(e) = validate_segment(&self.adapter_prefix) {
            return Err(ConfigValidationError::InvalidAdapterPrefix {
                prefix: self.adapter_prefix.clone(),
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid adapter prefix '{prefix}': {reason}")]
    InvalidAdapterPrefix { prefix: String, reason: String },
}

/// Builder for [`ContractConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ContractConfigBuilder {
    adapter_prefix: Option<String>,
    verify_lineage: Option<bool>,
    verify_feature_names: Option<bool>,
}

impl ContractConfigBuilder {
    /// Set the path segment wrapped parameters are re-exported under.
    pub fn adapter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.adapter_prefix = Some(prefix.into());
        self
    }

    /// Enable or disable lineage validation in conformance checks.
    pub fn verify_lineage(mut self, verify: bool) -> Self {
        self.verify_lineage = Some(verify);
        self
    }

    /// Enable or disable `feature_names_out` validation in conformance checks.
    pub fn verify_feature_names(mut self, verify: bool) -> Self {
        self.verify_feature_names = Some(verify);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ContractConfig` or an error if validation fails.
    pub fn build(self) -> Result<ContractConfig, ConfigValidationError> {
        let config = ContractConfig {
            adapter_prefix: self
                .adapter_prefix
                .unwrap_or_else(|| DEFAULT_ADAPTER_PREFIX.to_string()),
            verify_lineage: self.verify_lineage.unwrap_or(true),
            verify_feature_names: self.verify_feature_names.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
