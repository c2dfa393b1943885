//! Configuration validation.

use super::types::{AppConfig, BehaviorConfig, DeltaConfig, OutputConfig, TocConfig};
use crate::toc::EntryFactoryRegistry;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.toc.validate());
        errors.extend(self.delta.validate());
        errors.extend(self.output.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

/// Whether `name` can be used as an XML element name.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl Validatable for TocConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let builtin = EntryFactoryRegistry::builtin();
        for (i, tag) in self.extension_tags.iter().enumerate() {
            if !is_xml_name(tag) {
                errors.push(ConfigError::new(
                    format!("toc.extension_tags[{i}]"),
                    format!("'{tag}' is not a valid element name"),
                ));
            } else if builtin.contains(tag) {
                errors.push(ConfigError::new(
                    format!("toc.extension_tags[{i}]"),
                    format!("'{tag}' is a built-in entry kind"),
                ));
            }
        }
        if self.fallback_version_prefix.trim().is_empty() {
            errors.push(ConfigError::new(
                "toc.fallback_version_prefix",
                "Prefix must not be empty",
            ));
        }
        errors
    }
}

impl Validatable for DeltaConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (i, qualified) in self.ignored_properties.iter().enumerate() {
            let valid = qualified
                .split_once('.')
                .is_some_and(|(type_name, property)| !type_name.is_empty() && !property.is_empty());
            if !valid {
                errors.push(ConfigError::new(
                    format!("delta.ignored_properties[{i}]"),
                    format!("'{qualified}' must have the form Type.property"),
                ));
            }
        }
        if self.association_methods.keys().any(|name| name.trim().is_empty()) {
            errors.push(ConfigError::new(
                "delta.association_methods",
                "Association names must not be empty",
            ));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Validate output file path if specified
        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError::new(
                        "output.file",
                        format!("Parent directory does not exist: {}", parent.display()),
                    ));
                }
            }
        }

        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}
