//! Normalize command handler.
//!
//! Loads a table of contents and writes it back in canonical form: entries in
//! load order, generations most recent first, instants in RFC 3339.

use super::output::{write_output, OutputTarget};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the normalize command.
pub fn run_normalize(path: &Path, config: &AppConfig) -> Result<()> {
    let toc = config
        .toc_loader()
        .load_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let xml = toc.to_xml().context("failed to serialize table of contents")?;

    let target = OutputTarget::from_option(config.output.file.clone());
    write_output(&xml, &target, config.behavior.quiet)
}
