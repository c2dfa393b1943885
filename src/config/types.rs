//! Configuration types for product-runtime operations.

use crate::delta::ComputationMethod;
use crate::toc::DEFAULT_FALLBACK_PREFIX;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or
/// config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Table of contents loading
    pub toc: TocConfig,
    /// Structural comparison policy
    pub delta: DeltaConfig,
    /// Output configuration (format, file)
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Register an additional entry tag loaded as a custom entry.
    pub fn extension_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.toc.extension_tags.push(tag.into());
        self
    }

    /// Load indexes as modifiable.
    pub const fn modifiable(mut self, modifiable: bool) -> Self {
        self.config.toc.modifiable = modifiable;
        self
    }

    /// Prefix of placeholder product data versions.
    pub fn fallback_version_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.toc.fallback_version_prefix = prefix.into();
        self
    }

    /// Packaging version substituted for the deferred version marker.
    pub fn packaging_version(mut self, version: impl Into<String>) -> Self {
        self.config.toc.packaging_version = Some(version.into());
        self
    }

    /// Pairing strategy for associations without an explicit one.
    pub const fn default_method(mut self, method: ComputationMethod) -> Self {
        self.config.delta.default_method = method;
        self
    }

    /// Pairing strategy for one association.
    pub fn association_method(mut self, association: impl Into<String>, method: ComputationMethod) -> Self {
        self.config.delta.association_methods.insert(association.into(), method);
        self
    }

    /// Ignore a property, given as `Type.property`.
    pub fn ignore_property(mut self, qualified: impl Into<String>) -> Self {
        self.config.delta.ignored_properties.push(qualified.into());
        self
    }

    /// Compare objects' own properties only.
    pub const fn ignore_associations(mut self, ignore: bool) -> Self {
        self.config.delta.ignore_associations = ignore;
        self
    }

    /// Expand added and removed objects into subtree deltas.
    pub const fn create_subtree_delta(mut self, create: bool) -> Self {
        self.config.delta.create_subtree_delta = create;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Enable fail-on-change mode.
    pub const fn fail_on_change(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_change = fail;
        self
    }

    /// Enable quiet mode.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section types
// ============================================================================

/// Table of contents loading options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TocConfig {
    /// Element tags loaded as custom entries in addition to the built-in kinds
    pub extension_tags: Vec<String>,
    /// Build indexes that accept entry removal
    pub modifiable: bool,
    /// Prefix of the placeholder version used when `${packaging.version}`
    /// cannot be resolved
    pub fallback_version_prefix: String,
    /// Packaging version substituted for `${packaging.version}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging_version: Option<String>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            extension_tags: Vec::new(),
            modifiable: false,
            fallback_version_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
            packaging_version: None,
        }
    }
}

/// Structural comparison policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DeltaConfig {
    /// Pairing strategy per association name
    pub association_methods: BTreeMap<String, ComputationMethod>,
    /// Pairing strategy for all other associations
    pub default_method: ComputationMethod,
    /// Properties left out of the comparison, as `Type.property`
    pub ignored_properties: Vec<String>,
    /// Compare objects' own properties only
    pub ignore_associations: bool,
    /// Expand added and removed objects into deltas for their whole subtree
    pub create_subtree_delta: bool,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            association_methods: BTreeMap::new(),
            // Table of contents entries are identified by tag and id, not by
            // position in the file.
            default_method: ComputationMethod::ByObject,
            ignored_properties: Vec::new(),
            ignore_associations: false,
            create_subtree_delta: false,
        }
    }
}

/// Output format for command results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,
    /// Output file path (stdout when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Behavior flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress non-essential output
    pub quiet: bool,
    /// Exit with code 1 when `diff` finds changes
    pub fail_on_change: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .extension_tag("Formula")
            .modifiable(true)
            .association_method("generations", ComputationMethod::ByPosition)
            .ignore_property("ProductComponent.resource")
            .output_format(OutputFormat::Json)
            .fail_on_change(true)
            .build();

        assert_eq!(config.toc.extension_tags, ["Formula"]);
        assert!(config.toc.modifiable);
        assert_eq!(
            config.delta.association_methods.get("generations"),
            Some(&ComputationMethod::ByPosition)
        );
        assert_eq!(config.delta.default_method, ComputationMethod::ByObject);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.behavior.fail_on_change);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("delta:\n  ignore_associations: true\n")
            .expect("valid yaml");
        assert!(config.delta.ignore_associations);
        assert_eq!(config.delta.default_method, ComputationMethod::ByObject);
        assert_eq!(config.toc.fallback_version_prefix, DEFAULT_FALLBACK_PREFIX);
    }
}
