//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod diff;
mod inspect;
mod normalize;
mod output;
mod resolve;

pub use diff::run_diff;
pub use inspect::{run_inspect, InspectSummary};
pub use normalize::run_normalize;
pub use output::{render, write_output, OutputTarget};
pub use resolve::{run_resolve, ProductSelector, Resolution, ResolvedGeneration};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no changes detected (or changes without --fail-on-change)
    pub const SUCCESS: i32 = 0;
    /// Changes were detected
    pub const CHANGES_DETECTED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
