//! Persisted table of contents format.
//!
//! ```xml
//! <ProductDataToc productDataVersion="2.4.0">
//!   <ProductComponent id="motor.2024-01" qualifiedName="products.Motor 2024-01"
//!                     resource="products/Motor.xml" implementationType="org.Motor"
//!                     kindId="products.Motor" versionId="2024-01">
//!     <Generation validFrom="2024-01-01T00:00:00Z"/>
//!   </ProductComponent>
//!   <TableContents id="rates" qualifiedName="tables.Rates" resource="tables/Rates.xml"
//!                  implementationType="org.Rates"/>
//! </ProductDataToc>
//! ```
//!
//! The product data version may be the marker `${packaging.version}`, which is
//! resolved at load time through a [`VersionResolver`].

use super::index::TableOfContents;
use super::registry::EntryFactoryRegistry;
use crate::error::{ErrorContext, LoadErrorKind, Result, TocError};
use crate::xml::XmlElement;
use chrono::Utc;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Root element of the persisted format.
pub const ROOT_TAG: &str = "ProductDataToc";
/// Root attribute holding the product data version.
pub const ATTR_PRODUCT_DATA_VERSION: &str = "productDataVersion";
/// Deferred product data version, resolved against packaging metadata.
pub const VERSION_MARKER: &str = "${packaging.version}";
/// Prefix of generated placeholder versions when none is configured.
pub const DEFAULT_FALLBACK_PREFIX: &str = "0.0.0";

/// Supplies the packaging version that replaces [`VERSION_MARKER`].
pub trait VersionResolver: Send + Sync {
    /// The packaging version, or `None` when it cannot be determined.
    fn resolve(&self) -> Option<String>;
}

impl<F> VersionResolver for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn resolve(&self) -> Option<String> {
        self()
    }
}

/// Resolver returning a fixed version.
#[derive(Debug, Clone)]
pub struct StaticVersion(pub String);

impl VersionResolver for StaticVersion {
    fn resolve(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Builds [`TableOfContents`] instances from the persisted format.
///
/// Loading is all-or-nothing: every entry is parsed before the index is
/// created, so a structural error never leaves a partially filled index
/// behind.
#[derive(Clone)]
pub struct TocLoader {
    registry: Arc<EntryFactoryRegistry>,
    resolver: Option<Arc<dyn VersionResolver>>,
    modifiable: bool,
    fallback_prefix: String,
}

impl Default for TocLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TocLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TocLoader")
            .field("registry", &self.registry)
            .field("has_resolver", &self.resolver.is_some())
            .field("modifiable", &self.modifiable)
            .field("fallback_prefix", &self.fallback_prefix)
            .finish()
    }
}

impl TocLoader {
    /// Loader with the built-in entry kinds, producing read-only indexes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(EntryFactoryRegistry::builtin()),
            resolver: None,
            modifiable: false,
            fallback_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: EntryFactoryRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    #[must_use]
    pub fn with_version_resolver(mut self, resolver: impl VersionResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Produce modifiable indexes.
    #[must_use]
    pub const fn modifiable(mut self, modifiable: bool) -> Self {
        self.modifiable = modifiable;
        self
    }

    #[must_use]
    pub fn with_fallback_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fallback_prefix = prefix.into();
        self
    }

    pub fn registry(&self) -> &EntryFactoryRegistry {
        &self.registry
    }

    /// Load from XML text.
    pub fn load_str(&self, content: &str) -> Result<TableOfContents> {
        let root = XmlElement::parse(content)?;
        self.load_element(&root)
    }

    /// Load from a file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<TableOfContents> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TocError::io(path, e))?;
        self.load_str(&content)
            .with_context(|| format!("loading {}", path.display()))
    }

    /// Build an index from an already parsed root element.
    pub fn load_element(&self, root: &XmlElement) -> Result<TableOfContents> {
        if root.name != ROOT_TAG {
            return Err(TocError::load(
                "reading root element",
                LoadErrorKind::UnexpectedRoot {
                    found: root.name.clone(),
                    expected: ROOT_TAG.to_string(),
                },
            ));
        }
        let declared = root.required_attribute(ATTR_PRODUCT_DATA_VERSION)?;
        let version = self.resolve_version(declared);

        let entries = root
            .children
            .iter()
            .map(|child| self.registry.create(child))
            .collect::<Result<Vec<_>>>()?;

        let toc = if self.modifiable {
            TableOfContents::modifiable(version)
        } else {
            TableOfContents::readonly(version)
        };
        for entry in entries {
            toc.add_entry(entry);
        }
        tracing::debug!(
            version = toc.product_data_version(),
            entries = toc.len(),
            modifiable = self.modifiable,
            "loaded table of contents"
        );
        Ok(toc)
    }

    fn resolve_version(&self, declared: &str) -> String {
        if declared != VERSION_MARKER {
            return declared.to_string();
        }
        if let Some(version) = self.resolver.as_ref().and_then(|r| r.resolve()) {
            return version;
        }
        let fallback = fallback_version(&self.fallback_prefix);
        tracing::warn!(
            fallback = %fallback,
            "could not resolve {VERSION_MARKER}; using a local placeholder version"
        );
        fallback
    }
}

/// Placeholder version for unresolvable markers: `<prefix>-local.<timestamp>`.
pub fn fallback_version(prefix: &str) -> String {
    format!("{prefix}-local.{}", Utc::now().format("%Y%m%d%H%M%S"))
}

// ============================================================================
// Saving
// ============================================================================

impl TableOfContents {
    /// Load with the built-in entry kinds.
    pub fn from_xml_str(content: &str) -> Result<Self> {
        TocLoader::new().load_str(content)
    }

    /// Load a file with the built-in entry kinds.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        TocLoader::new().load_path(path)
    }

    /// The persisted form as an element tree, entries in insertion order.
    pub fn to_element(&self) -> XmlElement {
        let mut root =
            XmlElement::new(ROOT_TAG).with_attribute(ATTR_PRODUCT_DATA_VERSION, self.product_data_version());
        for entry in self.entries() {
            root.push_child(entry.to_element());
        }
        root
    }

    /// Serialize to XML text.
    pub fn to_xml(&self) -> Result<String> {
        self.to_element().to_xml_string()
    }

    /// Serialize to a file.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let xml = self.to_xml()?;
        std::fs::write(path, xml).map_err(|e| TocError::io(path, e))?;
        tracing::debug!(path = %path.display(), entries = self.len(), "wrote table of contents");
        Ok(())
    }
}
