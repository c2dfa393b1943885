//! **Runtime index and structural comparison for versioned product data.**
//!
//! `product-runtime` answers two questions about a release of product data:
//! where is the persisted artifact with a given identity, and which revision
//! of a product is in force at a given instant. It also compares two object
//! graphs, typically two releases of the same index, and reports what changed
//! as a tree of deltas.
//!
//! ## Core Concepts & Modules
//!
//! - **[`toc`]**: the temporal product index. A [`TableOfContents`] maps ids,
//!   qualified names and kind/version pairs to [`TocEntry`] records; every
//!   [`ProductTocEntry`] carries a [`GenerationSeries`] resolving "as of",
//!   "next" and "previous" generations in logarithmic time. Indexes are loaded
//!   from and written to the `ProductDataToc` XML format by a [`TocLoader`].
//! - **[`delta`]**: the structural delta engine. Types implement
//!   [`ModelObject`]; [`compute_delta`] walks two graphs under a
//!   [`DeltaComputationOptions`] policy and returns a [`ModelObjectDelta`]
//!   tree that can be walked with a [`DeltaVisitor`], printed or serialised.
//! - **[`config`]**: YAML configuration, presets and validation.
//! - **[`cli`]**: handlers behind the `product-runtime` binary.
//!
//! ## Resolving a Generation
//!
//! ```no_run
//! use product_runtime::{parse_instant, TableOfContents};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let toc = TableOfContents::load_from_path("release/toc.xml")?;
//!     let product = toc
//!         .entry(Some("motor"), Some("2024"))?
//!         .ok_or("unknown product")?;
//!
//!     let at = parse_instant("2024-08-15")?;
//!     if let Some(generation) = product.generation_as_of(at) {
//!         println!("in force since {}", generation.valid_from);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Comparing Two Releases
//!
//! ```no_run
//! use product_runtime::{compute_delta, DefaultDeltaOptions, ModelObject, TableOfContents};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let old = TableOfContents::load_from_path("old/toc.xml")?.snapshot();
//!     let new = TableOfContents::load_from_path("new/toc.xml")?.snapshot();
//!
//!     let options = DefaultDeltaOptions::new();
//!     let delta = compute_delta(
//!         Some(&old as &dyn ModelObject),
//!         Some(&new as &dyn ModelObject),
//!         &options,
//!     )?;
//!     print!("{delta}");
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod config;
pub mod delta;
pub mod error;
pub mod toc;
pub mod xml;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset};
pub use config::{BehaviorConfig, DeltaConfig, OutputConfig, OutputFormat, TocConfig};
pub use config::{ConfigError, Validatable};
pub use delta::{
    compute_delta, ComputationMethod, DefaultDeltaOptions, DeltaComputationOptions, DeltaContext,
    DeltaKind, DeltaVisitor, KindOfChange, ModelObject, ModelObjectDelta,
};
pub use error::{ErrorContext, OptionContext, Result, TocError};
pub use toc::{
    parse_instant, EntryFactoryRegistry, GenerationSeries, GenerationTocEntry, ProductTocEntry,
    TableOfContents, TocEntry, TocLoader,
};
