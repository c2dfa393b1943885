//! Output routing for command results.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Output written to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Render a command result in the requested format.
///
/// Text output uses the value's `Display` implementation, JSON output its
/// `Serialize` implementation.
pub fn render<T, S>(format: OutputFormat, text: &T, json: &S) -> Result<String>
where
    T: Display + ?Sized,
    S: Serialize + ?Sized,
{
    match format {
        OutputFormat::Text => Ok(text.to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(json).context("failed to serialize output as JSON")
        }
    }
}
