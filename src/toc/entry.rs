//! Table of contents entries.
//!
//! Every persisted artifact is described by one [`TocEntry`]. The enum has one
//! variant per entry kind, so the index's lookup maintenance and the
//! serializer are exhaustive matches: a new kind cannot be forgotten in one of
//! them.

use super::generation::{format_instant, GenerationSeries, GenerationTocEntry};
use crate::xml::XmlElement;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

// Element tags of the built-in entry kinds.
pub const PRODUCT_TAG: &str = "ProductComponent";
pub const GENERATION_TAG: &str = "Generation";
pub const TABLE_TAG: &str = "TableContents";
pub const TEST_CASE_TAG: &str = "TestCase";
pub const POLICY_TYPE_TAG: &str = "PolicyType";
pub const PRODUCT_TYPE_TAG: &str = "ProductType";
pub const ENUM_CONTENT_TAG: &str = "EnumContent";
pub const ENUM_XML_ADAPTER_TAG: &str = "EnumXmlAdapter";

// Attribute names shared by the persisted format.
pub const ATTR_ID: &str = "id";
pub const ATTR_QUALIFIED_NAME: &str = "qualifiedName";
pub const ATTR_RESOURCE: &str = "resource";
pub const ATTR_IMPLEMENTATION_TYPE: &str = "implementationType";
pub const ATTR_KIND_ID: &str = "kindId";
pub const ATTR_VERSION_ID: &str = "versionId";
pub const ATTR_VALID_TO: &str = "validTo";
pub const ATTR_GENERATION_IMPLEMENTATION_TYPE: &str = "generationImplementationType";
pub const ATTR_VALID_FROM: &str = "validFrom";

/// Fields common to every entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntryBase {
    pub id: String,
    pub qualified_name: String,
    /// Reference to the backing resource holding the artifact's data
    pub resource_ref: String,
    pub implementation_type: String,
}

impl TocEntryBase {
    pub fn new(
        id: impl Into<String>,
        qualified_name: impl Into<String>,
        resource_ref: impl Into<String>,
        implementation_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            qualified_name: qualified_name.into(),
            resource_ref: resource_ref.into(),
            implementation_type: implementation_type.into(),
        }
    }

    /// Write the common attributes onto an element. An empty resource is
    /// only written when the entry kind requires the attribute.
    pub(crate) fn write_attributes(&self, element: &mut XmlElement, resource_required: bool) {
        element.set_attribute(ATTR_ID, &self.id);
        element.set_attribute(ATTR_QUALIFIED_NAME, &self.qualified_name);
        if resource_required || !self.resource_ref.is_empty() {
            element.set_attribute(ATTR_RESOURCE, &self.resource_ref);
        }
        element.set_attribute(ATTR_IMPLEMENTATION_TYPE, &self.implementation_type);
    }
}

/// A product component: one version of a product kind, with its generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTocEntry {
    #[serde(flatten)]
    pub base: TocEntryBase,
    pub kind_id: String,
    pub version_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_implementation_type: Option<String>,
    generations: GenerationSeries,
}

impl ProductTocEntry {
    pub fn new(base: TocEntryBase, kind_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            base,
            kind_id: kind_id.into(),
            version_id: version_id.into(),
            valid_to: None,
            generation_implementation_type: None,
            generations: GenerationSeries::new(),
        }
    }

    #[must_use]
    pub fn with_valid_to(mut self, valid_to: DateTime<Utc>) -> Self {
        self.valid_to = Some(valid_to);
        self
    }

    #[must_use]
    pub fn with_generation_implementation_type(mut self, implementation_type: impl Into<String>) -> Self {
        self.generation_implementation_type = Some(implementation_type.into());
        self
    }

    /// Builder-style [`add_generation`](Self::add_generation).
    #[must_use]
    pub fn with_generation(mut self, generation: GenerationTocEntry) -> Self {
        self.add_generation(generation);
        self
    }

    /// Add a generation to the series. An existing generation with the same
    /// validity start is replaced.
    pub fn add_generation(&mut self, generation: GenerationTocEntry) {
        let valid_from = generation.valid_from;
        if self.generations.insert(generation).is_some() {
            tracing::warn!(
                product = %self.base.id,
                valid_from = %format_instant(valid_from),
                "duplicate generation validity start; keeping the later definition"
            );
        }
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn qualified_name(&self) -> &str {
        &self.base.qualified_name
    }

    /// The product's generations, most recent first.
    pub fn generations(&self) -> &GenerationSeries {
        &self.generations
    }

    pub fn generation_count(&self) -> usize {
        self.generations.len()
    }

    /// Generation in force at `at`.
    pub fn generation_as_of(&self, at: DateTime<Utc>) -> Option<&GenerationTocEntry> {
        self.generations.as_of(at)
    }

    /// Generation following the one in force at `at`.
    pub fn next_generation_after(&self, at: DateTime<Utc>) -> Option<&GenerationTocEntry> {
        self.generations.next_after(at)
    }

    /// Generation preceding the one in force at `at`.
    pub fn previous_generation_before(&self, at: DateTime<Utc>) -> Option<&GenerationTocEntry> {
        self.generations.previous_before(at)
    }

    pub fn latest_generation(&self) -> Option<&GenerationTocEntry> {
        self.generations.latest()
    }

    /// Implementation type to instantiate for a generation: its own, else the
    /// product's generation implementation type.
    pub fn generation_implementation_type<'a>(&'a self, generation: &'a GenerationTocEntry) -> Option<&'a str> {
        generation
            .implementation_type
            .as_deref()
            .or(self.generation_implementation_type.as_deref())
    }

    /// Whether the product itself is still valid at `at`. `validTo` is
    /// inclusive; a product without one never expires.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_to.map_or(true, |valid_to| at <= valid_to)
    }
}

/// Whether a model type entry describes a policy or a product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTypeCategory {
    Policy,
    Product,
}

impl ModelTypeCategory {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Policy => POLICY_TYPE_TAG,
            Self::Product => PRODUCT_TYPE_TAG,
        }
    }
}

/// A policy or product type, looked up by implementation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModelTypeTocEntry {
    #[serde(flatten)]
    pub base: TocEntryBase,
    pub category: ModelTypeCategory,
}

/// An entry of a registered extension kind. Attributes beyond the common
/// ones are kept verbatim so the entry round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomTocEntry {
    pub tag: String,
    #[serde(flatten)]
    pub base: TocEntryBase,
    pub attributes: IndexMap<String, String>,
}

/// One persisted artifact, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entry", rename_all = "camelCase")]
pub enum TocEntry {
    Product(Arc<ProductTocEntry>),
    Table(Arc<TocEntryBase>),
    TestCase(Arc<TocEntryBase>),
    ModelType(Arc<ModelTypeTocEntry>),
    EnumContent(Arc<TocEntryBase>),
    EnumXmlAdapter(Arc<TocEntryBase>),
    Custom(Arc<CustomTocEntry>),
}

/// Identity of an entry inside an index: element tag plus id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub tag: String,
    pub id: String,
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag, self.id)
    }
}

impl TocEntry {
    pub fn product(entry: ProductTocEntry) -> Self {
        Self::Product(Arc::new(entry))
    }

    pub fn table(base: TocEntryBase) -> Self {
        Self::Table(Arc::new(base))
    }

    pub fn test_case(base: TocEntryBase) -> Self {
        Self::TestCase(Arc::new(base))
    }

    pub fn model_type(base: TocEntryBase, category: ModelTypeCategory) -> Self {
        Self::ModelType(Arc::new(ModelTypeTocEntry { base, category }))
    }

    pub fn enum_content(base: TocEntryBase) -> Self {
        Self::EnumContent(Arc::new(base))
    }

    pub fn enum_xml_adapter(base: TocEntryBase) -> Self {
        Self::EnumXmlAdapter(Arc::new(base))
    }

    pub fn custom(tag: impl Into<String>, base: TocEntryBase, attributes: IndexMap<String, String>) -> Self {
        Self::Custom(Arc::new(CustomTocEntry {
            tag: tag.into(),
            base,
            attributes,
        }))
    }

    /// Element tag this entry is persisted under.
    pub fn tag(&self) -> &str {
        match self {
            Self::Product(_) => PRODUCT_TAG,
            Self::Table(_) => TABLE_TAG,
            Self::TestCase(_) => TEST_CASE_TAG,
            Self::ModelType(m) => m.category.tag(),
            Self::EnumContent(_) => ENUM_CONTENT_TAG,
            Self::EnumXmlAdapter(_) => ENUM_XML_ADAPTER_TAG,
            Self::Custom(c) => &c.tag,
        }
    }

    pub fn base(&self) -> &TocEntryBase {
        match self {
            Self::Product(p) => &p.base,
            Self::Table(b) | Self::TestCase(b) | Self::EnumContent(b) | Self::EnumXmlAdapter(b) => b,
            Self::ModelType(m) => &m.base,
            Self::Custom(c) => &c.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn qualified_name(&self) -> &str {
        &self.base().qualified_name
    }

    pub fn key(&self) -> EntryKey {
        EntryKey {
            tag: self.tag().to_string(),
            id: self.id().to_string(),
        }
    }

    pub fn as_product(&self) -> Option<&Arc<ProductTocEntry>> {
        match self {
            Self::Product(p) => Some(p),
            _ => None,
        }
    }

    /// Whether the persisted form of this kind carries a `resource`
    /// attribute.
    pub const fn requires_resource(&self) -> bool {
        matches!(
            self,
            Self::Product(_) | Self::Table(_) | Self::TestCase(_) | Self::EnumContent(_)
        )
    }

    /// Persisted form of this entry.
    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new(self.tag());
        self.base().write_attributes(&mut element, self.requires_resource());

        match self {
            Self::Product(p) => {
                element.set_attribute(ATTR_KIND_ID, &p.kind_id);
                element.set_attribute(ATTR_VERSION_ID, &p.version_id);
                element.set_optional_attribute(
                    ATTR_VALID_TO,
                    p.valid_to.map(format_instant).as_deref(),
                );
                element.set_optional_attribute(
                    ATTR_GENERATION_IMPLEMENTATION_TYPE,
                    p.generation_implementation_type.as_deref(),
                );
                // Oldest first reads naturally in the file; order is irrelevant on load.
                for generation in p.generations().iter().rev() {
                    let mut child = XmlElement::new(GENERATION_TAG)
                        .with_attribute(ATTR_VALID_FROM, format_instant(generation.valid_from));
                    child.set_optional_attribute(
                        ATTR_IMPLEMENTATION_TYPE,
                        generation.implementation_type.as_deref(),
                    );
                    element.push_child(child);
                }
            }
            Self::Custom(c) => {
                for (key, value) in &c.attributes {
                    element.set_attribute(key, value);
                }
            }
            Self::Table(_)
            | Self::TestCase(_)
            | Self::ModelType(_)
            | Self::EnumContent(_)
            | Self::EnumXmlAdapter(_) => {}
        }
        element
    }
}

impl fmt::Display for TocEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.tag(), self.id(), self.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::generation::parse_instant;

    fn motor() -> ProductTocEntry {
        ProductTocEntry::new(
            TocEntryBase::new("motor.2024", "products.Motor 2024", "products/Motor.xml", "org.Motor"),
            "products.Motor",
            "2024",
        )
        .with_generation_implementation_type("org.MotorGen")
    }

    #[test]
    fn test_generation_implementation_type_fallback() {
        let own = GenerationTocEntry::new(parse_instant("2024-01-01").expect("date"))
            .with_implementation_type("org.SpecialGen");
        let plain = GenerationTocEntry::new(parse_instant("2024-07-01").expect("date"));
        let product = motor().with_generation(own.clone()).with_generation(plain.clone());

        assert_eq!(product.generation_implementation_type(&own), Some("org.SpecialGen"));
        assert_eq!(product.generation_implementation_type(&plain), Some("org.MotorGen"));
        assert_eq!(product.generation_count(), 2);
    }

    #[test]
    fn test_valid_to_is_inclusive() {
        let end = parse_instant("2025-12-31").expect("date");
        let product = motor().with_valid_to(end);
        assert!(product.is_valid_at(end));
        assert!(!product.is_valid_at(parse_instant("2026-01-01").expect("date")));
        assert!(motor().is_valid_at(parse_instant("2999-01-01").expect("date")));
    }

    #[test]
    fn test_key_and_tag() {
        let entry = TocEntry::model_type(
            TocEntryBase::new("Policy", "model.Policy", "", "org.Policy"),
            ModelTypeCategory::Policy,
        );
        assert_eq!(entry.tag(), POLICY_TYPE_TAG);
        assert_eq!(entry.key().to_string(), "PolicyType:Policy");
    }

    #[test]
    fn test_to_element_writes_generations_oldest_first() {
        let product = motor()
            .with_generation(GenerationTocEntry::new(parse_instant("2024-07-01").expect("date")))
            .with_generation(GenerationTocEntry::new(parse_instant("2024-01-01").expect("date")));
        let element = TocEntry::product(product).to_element();

        assert_eq!(element.name, PRODUCT_TAG);
        assert_eq!(element.attribute(ATTR_KIND_ID), Some("products.Motor"));
        let starts: Vec<_> = element
            .children_named(GENERATION_TAG)
            .filter_map(|g| g.attribute(ATTR_VALID_FROM))
            .collect();
        assert_eq!(starts, ["2024-01-01T00:00:00Z", "2024-07-01T00:00:00Z"]);
    }

    #[test]
    fn test_model_type_without_resource_omits_attribute() {
        let element = TocEntry::model_type(
            TocEntryBase::new("Policy", "model.Policy", "", "org.Policy"),
            ModelTypeCategory::Policy,
        )
        .to_element();
        assert!(element.attribute(ATTR_RESOURCE).is_none());
    }

    #[test]
    fn test_product_without_resource_keeps_attribute() {
        let product = ProductTocEntry::new(
            TocEntryBase::new("m", "products.M", "", "org.M"),
            "products.M",
            "1",
        );
        let element = TocEntry::product(product).to_element();
        assert_eq!(element.attribute(ATTR_RESOURCE), Some(""));
    }
}
