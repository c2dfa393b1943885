//! Temporal product index.
//!
//! A [`TableOfContents`] maps stable identifiers of persisted product data to
//! [`TocEntry`] records, and each [`ProductTocEntry`] owns a chronological
//! [`GenerationSeries`] answering "which revision is in force at time T".

mod entry;
mod format;
mod generation;
mod index;
mod registry;

pub use entry::{
    CustomTocEntry, EntryKey, ModelTypeCategory, ModelTypeTocEntry, ProductTocEntry, TocEntry,
    TocEntryBase, ENUM_CONTENT_TAG, ENUM_XML_ADAPTER_TAG, GENERATION_TAG, POLICY_TYPE_TAG,
    PRODUCT_TAG, PRODUCT_TYPE_TAG, TABLE_TAG, TEST_CASE_TAG,
};
pub use format::{
    fallback_version, StaticVersion, TocLoader, VersionResolver, ATTR_PRODUCT_DATA_VERSION,
    DEFAULT_FALLBACK_PREFIX, ROOT_TAG, VERSION_MARKER,
};
pub use generation::{format_instant, parse_instant, GenerationSeries, GenerationTocEntry};
pub use index::{TableOfContents, TocSnapshot};
pub use registry::{CustomEntryFactory, EntryFactoryRegistry, TocEntryFactory};
