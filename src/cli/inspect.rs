//! Inspect command handler.
//!
//! Implements the `inspect` subcommand, which loads a table of contents and
//! summarises what it holds.

use super::output::{render, write_output, OutputTarget};
use crate::config::AppConfig;
use crate::toc::TableOfContents;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Summary of a loaded table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectSummary {
    pub path: PathBuf,
    pub product_data_version: String,
    pub modifiable: bool,
    pub total_entries: usize,
    pub entries_by_tag: BTreeMap<String, usize>,
    pub kind_ids: Vec<String>,
    pub generations: usize,
}

impl InspectSummary {
    /// Summarise an index loaded from `path`.
    #[must_use]
    pub fn new(path: &Path, toc: &TableOfContents) -> Self {
        Self {
            path: path.to_path_buf(),
            product_data_version: toc.product_data_version().to_string(),
            modifiable: toc.is_modifiable(),
            total_entries: toc.len(),
            entries_by_tag: toc.counts_by_tag(),
            kind_ids: toc.kind_ids(),
            generations: toc
                .product_entries()
                .iter()
                .map(|product| product.generation_count())
                .sum(),
        }
    }
}

impl fmt::Display for InspectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table of contents: {}", self.path.display())?;
        writeln!(f, "Product data version: {}", self.product_data_version)?;
        writeln!(f, "Entries: {}", self.total_entries)?;
        for (tag, count) in &self.entries_by_tag {
            writeln!(f, "  {tag:<20} {count}")?;
        }
        writeln!(f, "Generations: {}", self.generations)?;
        if self.kind_ids.is_empty() {
            write!(f, "Product kinds: none")
        } else {
            write!(f, "Product kinds: {}", self.kind_ids.join(", "))
        }
    }
}

/// Run the inspect command.
pub fn run_inspect(path: &Path, config: &AppConfig) -> Result<()> {
    let toc = config
        .toc_loader()
        .load_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let summary = InspectSummary::new(path, &toc);

    let content = render(config.output.format, &summary, &summary)?;
    let target = OutputTarget::from_option(config.output.file.clone());
    write_output(&content, &target, config.behavior.quiet)
}
