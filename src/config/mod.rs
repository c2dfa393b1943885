//! Configuration module for product-runtime.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use product_runtime::config::{AppConfig, ConfigPreset};
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use a preset
//! let config = AppConfig::from_preset(ConfigPreset::CiCd);
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .extension_tag("Formula")
//!     .ignore_property("ProductComponent.resource")
//!     .fail_on_change(true)
//!     .build();
//!
//! // Load from file
//! use product_runtime::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.product-runtime.yaml` file in your project root or
//! `~/.config/product-runtime/`:
//!
//! ```yaml
//! toc:
//!   extension_tags: [Formula]
//! delta:
//!   association_methods:
//!     generations: by-position
//! behavior:
//!   fail_on_change: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::ConfigPreset;
pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, DeltaConfig, OutputConfig, OutputFormat,
    TocConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, user_config_dir, ConfigFileError,
};

use crate::delta::DefaultDeltaOptions;
use crate::toc::{EntryFactoryRegistry, StaticVersion, TocLoader};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.product-runtime.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

impl AppConfig {
    /// Loader configured from the `toc` section.
    #[must_use]
    pub fn toc_loader(&self) -> TocLoader {
        let loader = TocLoader::new()
            .with_registry(
                EntryFactoryRegistry::builtin().with_extension_tags(self.toc.extension_tags.iter().cloned()),
            )
            .modifiable(self.toc.modifiable)
            .with_fallback_prefix(self.toc.fallback_version_prefix.clone());
        match &self.toc.packaging_version {
            Some(version) => loader.with_version_resolver(StaticVersion(version.clone())),
            None => loader,
        }
    }

    /// Delta options configured from the `delta` section.
    #[must_use]
    pub fn delta_options(&self) -> DefaultDeltaOptions {
        DefaultDeltaOptions::from(&self.delta)
    }
}
