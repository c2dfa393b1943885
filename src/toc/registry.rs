//! Entry factories keyed by element tag.
//!
//! The set of entry kinds a table of contents understands is open: the
//! built-in factories cover the standard kinds, and callers add their own
//! with [`EntryFactoryRegistry::register`] before loading.

use super::entry::{
    ModelTypeCategory, ProductTocEntry, TocEntry, TocEntryBase, ATTR_GENERATION_IMPLEMENTATION_TYPE,
    ATTR_ID, ATTR_IMPLEMENTATION_TYPE, ATTR_KIND_ID, ATTR_QUALIFIED_NAME, ATTR_RESOURCE,
    ATTR_VALID_FROM, ATTR_VALID_TO, ATTR_VERSION_ID, ENUM_CONTENT_TAG, ENUM_XML_ADAPTER_TAG,
    GENERATION_TAG, POLICY_TYPE_TAG, PRODUCT_TAG, PRODUCT_TYPE_TAG, TABLE_TAG, TEST_CASE_TAG,
};
use super::generation::{parse_instant, GenerationTocEntry};
use crate::error::{ErrorContext, Result, TocError};
use crate::xml::XmlElement;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Creates entries from persisted elements of one tag.
pub trait TocEntryFactory: Send + Sync {
    /// Element tag this factory handles.
    fn tag(&self) -> &str;

    /// Build an entry from its element.
    fn create(&self, element: &XmlElement) -> Result<TocEntry>;
}

/// Factory for one of the built-in kinds.
struct BuiltinFactory {
    tag: &'static str,
    build: fn(&XmlElement) -> Result<TocEntry>,
}

impl TocEntryFactory for BuiltinFactory {
    fn tag(&self) -> &str {
        self.tag
    }

    fn create(&self, element: &XmlElement) -> Result<TocEntry> {
        (self.build)(element)
    }
}

/// Factory for extension kinds that need no special fields.
///
/// Produces [`TocEntry::Custom`] entries; attributes other than the common
/// ones are carried along untouched.
#[derive(Debug, Clone)]
pub struct CustomEntryFactory {
    tag: String,
}

impl CustomEntryFactory {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl TocEntryFactory for CustomEntryFactory {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn create(&self, element: &XmlElement) -> Result<TocEntry> {
        let base = read_base(element, false)?;
        let attributes: IndexMap<String, String> = element
            .attributes
            .iter()
            .filter(|(key, _)| !is_base_attribute(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(TocEntry::custom(self.tag.clone(), base, attributes))
    }
}

/// Mapping from element tag to entry factory.
#[derive(Clone)]
pub struct EntryFactoryRegistry {
    factories: HashMap<String, Arc<dyn TocEntryFactory>>,
}

impl EntryFactoryRegistry {
    /// A registry with no factories at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the built-in entry kinds.
    #[must_use]
    pub fn builtin() -> Self {
        let builtins: [BuiltinFactory; 7] = [
            BuiltinFactory {
                tag: PRODUCT_TAG,
                build: build_product,
            },
            BuiltinFactory {
                tag: TABLE_TAG,
                build: |e| Ok(TocEntry::table(read_base(e, true)?)),
            },
            BuiltinFactory {
                tag: TEST_CASE_TAG,
                build: |e| Ok(TocEntry::test_case(read_base(e, true)?)),
            },
            BuiltinFactory {
                tag: POLICY_TYPE_TAG,
                build: |e| Ok(TocEntry::model_type(read_base(e, false)?, ModelTypeCategory::Policy)),
            },
            BuiltinFactory {
                tag: PRODUCT_TYPE_TAG,
                build: |e| Ok(TocEntry::model_type(read_base(e, false)?, ModelTypeCategory::Product)),
            },
            BuiltinFactory {
                tag: ENUM_CONTENT_TAG,
                build: |e| Ok(TocEntry::enum_content(read_base(e, true)?)),
            },
            BuiltinFactory {
                tag: ENUM_XML_ADAPTER_TAG,
                build: |e| Ok(TocEntry::enum_xml_adapter(read_base(e, false)?)),
            },
        ];

        let mut registry = Self::empty();
        for factory in builtins {
            registry.register(Arc::new(factory));
        }
        registry
    }

    /// Register a factory; it replaces any factory for the same tag.
    pub fn register(&mut self, factory: Arc<dyn TocEntryFactory>) {
        self.factories.insert(factory.tag().to_string(), factory);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn TocEntryFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Register a [`CustomEntryFactory`] for each tag. Tags that already
    /// have a factory keep it.
    #[must_use]
    pub fn with_extension_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if self.contains(&tag) {
                tracing::warn!("Extension tag <{tag}> is already registered, keeping existing factory");
                continue;
            }
            self.register(Arc::new(CustomEntryFactory::new(tag)));
        }
        self
    }

    pub fn factory_for(&self, tag: &str) -> Option<&Arc<dyn TocEntryFactory>> {
        self.factories.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Build an entry with the factory registered for the element's tag.
    pub fn create(&self, element: &XmlElement) -> Result<TocEntry> {
        let factory = self
            .factory_for(&element.name)
            .ok_or_else(|| TocError::unknown_tag(&element.name))?;
        factory.create(element).with_context(|| {
            format!(
                "<{}> '{}'",
                element.name,
                element.attribute(ATTR_ID).unwrap_or("?")
            )
        })
    }
}

impl Default for EntryFactoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for EntryFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryFactoryRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

// ============================================================================
// Element readers
// ============================================================================

fn is_base_attribute(key: &str) -> bool {
    matches!(
        key,
        ATTR_ID | ATTR_QUALIFIED_NAME | ATTR_RESOURCE | ATTR_IMPLEMENTATION_TYPE
    )
}

fn read_base(element: &XmlElement, resource_required: bool) -> Result<TocEntryBase> {
    // Present on every kind that needs one, even when empty, so saved
    // indexes always reload.
    let resource_ref = if resource_required {
        element.present_attribute(ATTR_RESOURCE)?
    } else {
        element.attribute(ATTR_RESOURCE).unwrap_or_default()
    };
    Ok(TocEntryBase::new(
        element.required_attribute(ATTR_ID)?,
        element.required_attribute(ATTR_QUALIFIED_NAME)?,
        resource_ref,
        element.required_attribute(ATTR_IMPLEMENTATION_TYPE)?,
    ))
}

fn read_instant(element: &XmlElement, attribute: &str) -> Result<Option<DateTime<Utc>>> {
    element
        .attribute(attribute)
        .map(|text| parse_instant(text).map_err(|message| TocError::invalid_attribute(attribute, message)))
        .transpose()
}

fn build_product(element: &XmlElement) -> Result<TocEntry> {
    let base = read_base(element, true)?;
    let mut product = ProductTocEntry::new(
        base,
        element.required_attribute(ATTR_KIND_ID)?,
        element.required_attribute(ATTR_VERSION_ID)?,
    );
    if let Some(valid_to) = read_instant(element, ATTR_VALID_TO)? {
        product = product.with_valid_to(valid_to);
    }
    if let Some(gen_type) = element.attribute(ATTR_GENERATION_IMPLEMENTATION_TYPE) {
        product = product.with_generation_implementation_type(gen_type);
    }

    for child in &element.children {
        if child.name != GENERATION_TAG {
            return Err(TocError::unknown_tag(&child.name))
                .context(format!("inside <{PRODUCT_TAG}>"));
        }
        let valid_from = read_instant(child, ATTR_VALID_FROM)?
            .ok_or_else(|| TocError::missing_attribute(ATTR_VALID_FROM, GENERATION_TAG))?;
        let mut generation = GenerationTocEntry::new(valid_from);
        if let Some(implementation_type) = child.attribute(ATTR_IMPLEMENTATION_TYPE) {
            generation = generation.with_implementation_type(implementation_type);
        }
        product.add_generation(generation);
    }

    Ok(TocEntry::product(product))
}
