//! Structural delta engine.
//!
//! Compares two object graphs of [`ModelObject`]s and produces a tree of
//! [`ModelObjectDelta`] nodes. The comparison is driven by a
//! [`DeltaComputationOptions`] policy that decides how children are paired,
//! which properties are ignored and whether values are equal.
//!
//! # Example
//!
//! ```ignore
//! use product_runtime::delta::{compute_delta, DefaultDeltaOptions};
//!
//! let options = DefaultDeltaOptions::new();
//! let delta = compute_delta(Some(&old.snapshot()), Some(&new.snapshot()), &options)?;
//! if delta.has_changes() {
//!     print!("{delta}");
//! }
//! ```

mod compute;
mod node;
mod object;
mod options;
mod render;
mod toc;
mod visitor;

pub use compute::{compute_delta, DeltaContext};
pub use node::{DeltaKind, KindOfChange, ModelObjectDelta};
pub use object::{as_model_objects, AssociationKind, ChildAssociation, ModelObject};
pub use options::{ComputationMethod, DefaultDeltaOptions, DeltaComputationOptions};
pub use render::{DeltaCounts, DeltaSummary};
pub use toc::{ENTRIES_ASSOCIATION, GENERATIONS_ASSOCIATION};
pub use visitor::{DeltaVisitor, FnVisitor, LabelCollector};
