//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".product-runtime.yaml",
    ".product-runtime.yml",
    "product-runtime.yaml",
];

/// Directory under the user config directory holding the global config.
const CONFIG_DIR_NAME: &str = "product-runtime";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (~/.config/product-runtime/)
/// 4. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Use explicit path if provided
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. Search current directory
    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    // 3. Search user config directory
    if let Some(path) = user_config_dir().and_then(|dir| find_config_in_dir(&dir)) {
        return Some(path);
    }

    // 4. Search home directory
    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// The per-user configuration directory, whether or not it exists.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<ConfigFileError> for crate::error::TocError {
    fn from(err: ConfigFileError) -> Self {
        Self::config(err.to_string())
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// This is useful for layering CLI args over file config.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        // Toc config
        for tag in &other.toc.extension_tags {
            if !self.toc.extension_tags.contains(tag) {
                self.toc.extension_tags.push(tag.clone());
            }
        }
        if other.toc.modifiable {
            self.toc.modifiable = true;
        }
        if other.toc.fallback_version_prefix != defaults.toc.fallback_version_prefix {
            self.toc
                .fallback_version_prefix
                .clone_from(&other.toc.fallback_version_prefix);
        }
        if other.toc.packaging_version.is_some() {
            self.toc.packaging_version.clone_from(&other.toc.packaging_version);
        }

        // Delta config
        self.delta.association_methods.extend(
            other
                .delta
                .association_methods
                .iter()
                .map(|(name, method)| (name.clone(), *method)),
        );
        if other.delta.default_method != defaults.delta.default_method {
            self.delta.default_method = other.delta.default_method;
        }
        for property in &other.delta.ignored_properties {
            if !self.delta.ignored_properties.contains(property) {
                self.delta.ignored_properties.push(property.clone());
            }
        }
        if other.delta.ignore_associations {
            self.delta.ignore_associations = true;
        }
        if other.delta.create_subtree_delta {
            self.delta.create_subtree_delta = true;
        }

        // Output config - only override if explicitly set
        if other.output.format != defaults.output.format {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }

        // Behavior config (booleans - if set to true, override)
        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
        if other.behavior.fail_on_change {
            self.behavior.fail_on_change = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(config_path: Option<&Path>, cli_overrides: &Self) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    format!(
        r"# product-runtime configuration
# Place this file at .product-runtime.yaml in your project root or ~/.config/product-runtime/

{}",
        serde_yaml::to_string(&AppConfig::default()).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# product-runtime Configuration File
# ===================================
#
# Place it at:
#   - .product-runtime.yaml in your project root
#   - ~/.config/product-runtime/product-runtime.yaml for global config
#
# CLI arguments always override file settings.

# Table of contents loading
toc:
  # Additional element tags loaded as custom entries
  extension_tags: []
  # Build indexes that allow entry removal
  modifiable: false
  # Placeholder version prefix when ${packaging.version} cannot be resolved
  fallback_version_prefix: 0.0.0
  # Version substituted for ${packaging.version}
  # packaging_version: 2.4.0

# Structural comparison policy
delta:
  # Pairing strategy per association: by-position or by-object
  association_methods: {}
  #   generations: by-position
  default_method: by-object
  # Properties to ignore, as Type.property
  ignored_properties: []
  #   - ProductComponent.resource
  # Compare only the objects' own properties
  ignore_associations: false
  # Expand added/removed entries into their generations
  create_subtree_delta: false

# Output configuration
output:
  # Format: text, json
  format: text
  # Output file path (omit for stdout)
  # file: delta.json

# Behavior flags
behavior:
  # Suppress non-essential output
  quiet: false
  # Exit with code 1 if diff finds changes
  fail_on_change: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
