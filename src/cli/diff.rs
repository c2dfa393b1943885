//! Diff command handler.
//!
//! Implements the `diff` subcommand: both tables of contents are loaded,
//! snapshotted and compared with the structural delta engine.

use super::exit_codes;
use super::output::{render, write_output, OutputTarget};
use crate::config::AppConfig;
use crate::delta::{compute_delta, DeltaCounts, DeltaSummary, ModelObject, ModelObjectDelta};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// JSON document written by `diff --format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffReport {
    counts: DeltaCounts,
    delta: DeltaSummary,
}

/// Run the diff command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_diff(old: &Path, new: &Path, config: &AppConfig) -> Result<i32> {
    let quiet = config.behavior.quiet;
    let loader = config.toc_loader();
    let original = loader
        .load_path(old)
        .with_context(|| format!("failed to load {}", old.display()))?
        .snapshot();
    let reference = loader
        .load_path(new)
        .with_context(|| format!("failed to load {}", new.display()))?
        .snapshot();

    if !quiet {
        tracing::info!(
            "Loaded {} entries from old index, {} from new index",
            original.entries.len(),
            reference.entries.len()
        );
    }

    let options = config.delta_options();
    let delta = compute_delta(
        Some(&original as &dyn ModelObject),
        Some(&reference as &dyn ModelObject),
        &options,
    )
        .context("failed to compare indexes")?;
    let counts = delta.counts();

    if !quiet {
        tracing::info!(
            "{} added, {} removed, {} changed",
            counts.added,
            counts.removed,
            counts.changed
        );
    }

    let report = DiffReport {
        counts,
        delta: delta.summary(),
    };
    let content = render(config.output.format, &delta, &report)?;
    let target = OutputTarget::from_option(config.output.file.clone());
    write_output(&content, &target, quiet)?;

    Ok(determine_exit_code(config, &delta))
}

/// Determine the appropriate exit code based on the delta and config flags.
fn determine_exit_code(config: &AppConfig, delta: &ModelObjectDelta<'_>) -> i32 {
    if config.behavior.fail_on_change && !delta.is_empty() {
        return exit_codes::CHANGES_DETECTED;
    }
    exit_codes::SUCCESS
}
