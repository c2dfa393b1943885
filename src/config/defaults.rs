//! Named configuration presets.

use super::types::{AppConfig, OutputFormat};
use crate::delta::ComputationMethod;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Default settings: entries and generations paired by identity
    Default,
    /// CI/CD: JSON output, fail on changes
    CiCd,
    /// Compare children by position, so reordering shows up as a change
    Positional,
    /// Compare only top-level properties
    Shallow,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::CiCd => "ci-cd",
            Self::Positional => "positional",
            Self::Shallow => "shallow",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "ci-cd" | "ci" | "pipeline" => Some(Self::CiCd),
            "positional" | "by-position" => Some(Self::Positional),
            "shallow" => Some(Self::Shallow),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Entries and generations paired by identity, text output",
            Self::CiCd => "JSON output; diff exits with code 1 on any change",
            Self::Positional => "Children compared slot by slot; reordering counts as change",
            Self::Shallow => "Only the index's own properties are compared",
        }
    }

    /// All available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::CiCd, Self::Positional, Self::Shallow]
    }
}

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        let builder = Self::builder();
        match preset {
            ConfigPreset::Default => builder.build(),
            ConfigPreset::CiCd => builder
                .output_format(OutputFormat::Json)
                .fail_on_change(true)
                .quiet(true)
                .build(),
            ConfigPreset::Positional => builder.default_method(ComputationMethod::ByPosition).build(),
            ConfigPreset::Shallow => builder.ignore_associations(true).build(),
        }
    }
}
