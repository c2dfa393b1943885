//! The temporal product index.
//!
//! [`TableOfContents`] keeps several lookup structures over the same entries:
//!
//! - products by id, by qualified name and by kind id → version id
//! - tables and test cases by qualified name
//! - model types, enum contents and enum XML adapters by implementation type
//! - extension entries by tag → qualified name
//!
//! All of them sit behind one `RwLock`, so an `add_entry`/`remove_entry`
//! replaces an entry in every structure before any reader can look again.
//! Readers get `Arc` handles to immutable entries and never see a
//! half-updated version map.

use super::entry::{
    CustomTocEntry, EntryKey, ModelTypeTocEntry, ProductTocEntry, TocEntry, TocEntryBase,
};
use crate::error::{QueryErrorKind, Result, TocError};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Lookup structures guarded together.
#[derive(Debug, Default)]
struct TocTables {
    /// Every entry by identity, in insertion order
    entries: IndexMap<EntryKey, TocEntry>,
    products_by_id: HashMap<String, Arc<ProductTocEntry>>,
    products_by_name: HashMap<String, Arc<ProductTocEntry>>,
    products_by_kind: HashMap<String, BTreeMap<String, Arc<ProductTocEntry>>>,
    tables: HashMap<String, Arc<TocEntryBase>>,
    test_cases: HashMap<String, Arc<TocEntryBase>>,
    model_types: HashMap<String, Arc<ModelTypeTocEntry>>,
    enum_contents: HashMap<String, Arc<TocEntryBase>>,
    enum_xml_adapters: HashMap<String, Arc<TocEntryBase>>,
    custom: HashMap<String, HashMap<String, Arc<CustomTocEntry>>>,
}

type Entries = IndexMap<EntryKey, TocEntry>;

/// Secondary key and handle of an entry, for entries of one kind.
type Slot<'e, T> = Option<(&'e str, &'e Arc<T>)>;

/// Remove `key` from `map` if it still points at `value`, then hand the slot
/// to the most recently inserted remaining entry with the same key.
///
/// Secondary keys may collide between entries of different identity; the
/// map then holds the latest one, as if the remaining entries had been
/// inserted again in order.
fn unlink<T>(
    map: &mut HashMap<String, Arc<T>>,
    key: &str,
    value: &Arc<T>,
    entries: &Entries,
    slot: for<'e> fn(&'e TocEntry) -> Slot<'e, T>,
) {
    if !map.get(key).is_some_and(|current| Arc::ptr_eq(current, value)) {
        return;
    }
    map.remove(key);
    let survivor = entries
        .values()
        .rev()
        .filter_map(slot)
        .find(|(candidate_key, candidate)| *candidate_key == key && !Arc::ptr_eq(*candidate, value));
    if let Some((_, survivor)) = survivor {
        map.insert(key.to_string(), Arc::clone(survivor));
    }
}

fn product_name_slot(entry: &TocEntry) -> Slot<'_, ProductTocEntry> {
    match entry {
        TocEntry::Product(p) => Some((p.base.qualified_name.as_str(), p)),
        _ => None,
    }
}

fn product_id_slot(entry: &TocEntry) -> Slot<'_, ProductTocEntry> {
    match entry {
        TocEntry::Product(p) => Some((p.base.id.as_str(), p)),
        _ => None,
    }
}

fn table_slot(entry: &TocEntry) -> Slot<'_, TocEntryBase> {
    match entry {
        TocEntry::Table(b) => Some((b.qualified_name.as_str(), b)),
        _ => None,
    }
}

fn test_case_slot(entry: &TocEntry) -> Slot<'_, TocEntryBase> {
    match entry {
        TocEntry::TestCase(b) => Some((b.qualified_name.as_str(), b)),
        _ => None,
    }
}

fn model_type_slot(entry: &TocEntry) -> Slot<'_, ModelTypeTocEntry> {
    match entry {
        TocEntry::ModelType(m) => Some((m.base.implementation_type.as_str(), m)),
        _ => None,
    }
}

fn enum_content_slot(entry: &TocEntry) -> Slot<'_, TocEntryBase> {
    match entry {
        TocEntry::EnumContent(b) => Some((b.implementation_type.as_str(), b)),
        _ => None,
    }
}

fn enum_xml_adapter_slot(entry: &TocEntry) -> Slot<'_, TocEntryBase> {
    match entry {
        TocEntry::EnumXmlAdapter(b) => Some((b.implementation_type.as_str(), b)),
        _ => None,
    }
}

impl TocTables {
    fn insert(&mut self, entry: TocEntry) {
        let key = entry.key();
        match self.entries.get_mut(&key) {
            Some(current) => {
                // Replace in place so the entry keeps its position.
                let previous = std::mem::replace(current, entry.clone());
                self.unlink(&previous);
            }
            None => {
                self.entries.insert(key, entry.clone());
            }
        }
        self.link(&entry);
    }

    fn remove(&mut self, key: &EntryKey) -> Option<TocEntry> {
        let removed = self.entries.shift_remove(key)?;
        self.unlink(&removed);
        Some(removed)
    }

    fn link(&mut self, entry: &TocEntry) {
        match entry {
            TocEntry::Product(p) => {
                self.products_by_id.insert(p.base.id.clone(), Arc::clone(p));
                self.products_by_name
                    .insert(p.base.qualified_name.clone(), Arc::clone(p));
                self.products_by_kind
                    .entry(p.kind_id.clone())
                    .or_default()
                    .insert(p.version_id.clone(), Arc::clone(p));
            }
            TocEntry::Table(b) => {
                self.tables.insert(b.qualified_name.clone(), Arc::clone(b));
            }
            TocEntry::TestCase(b) => {
                self.test_cases.insert(b.qualified_name.clone(), Arc::clone(b));
            }
            TocEntry::ModelType(m) => {
                self.model_types
                    .insert(m.base.implementation_type.clone(), Arc::clone(m));
            }
            TocEntry::EnumContent(b) => {
                self.enum_contents
                    .insert(b.implementation_type.clone(), Arc::clone(b));
            }
            TocEntry::EnumXmlAdapter(b) => {
                self.enum_xml_adapters
                    .insert(b.implementation_type.clone(), Arc::clone(b));
            }
            TocEntry::Custom(c) => {
                self.custom
                    .entry(c.tag.clone())
                    .or_default()
                    .insert(c.base.qualified_name.clone(), Arc::clone(c));
            }
        }
    }

    /// Drop `entry` from the secondary structures. Must run after `entry`
    /// has left (or been replaced in) `entries`.
    fn unlink(&mut self, entry: &TocEntry) {
        let entries = &self.entries;
        match entry {
            TocEntry::Product(p) => {
                unlink(&mut self.products_by_id, &p.base.id, p, entries, product_id_slot);
                unlink(
                    &mut self.products_by_name,
                    &p.base.qualified_name,
                    p,
                    entries,
                    product_name_slot,
                );
                self.unlink_version(p);
            }
            TocEntry::Table(b) => unlink(&mut self.tables, &b.qualified_name, b, entries, table_slot),
            TocEntry::TestCase(b) => {
                unlink(&mut self.test_cases, &b.qualified_name, b, entries, test_case_slot);
            }
            TocEntry::ModelType(m) => {
                unlink(
                    &mut self.model_types,
                    &m.base.implementation_type,
                    m,
                    entries,
                    model_type_slot,
                );
            }
            TocEntry::EnumContent(b) => {
                unlink(
                    &mut self.enum_contents,
                    &b.implementation_type,
                    b,
                    entries,
                    enum_content_slot,
                );
            }
            TocEntry::EnumXmlAdapter(b) => {
                unlink(
                    &mut self.enum_xml_adapters,
                    &b.implementation_type,
                    b,
                    entries,
                    enum_xml_adapter_slot,
                );
            }
            TocEntry::Custom(c) => self.unlink_custom(c),
        }
    }

    fn unlink_version(&mut self, product: &Arc<ProductTocEntry>) {
        let Some(versions) = self.products_by_kind.get_mut(&product.kind_id) else {
            return;
        };
        if !versions
            .get(&product.version_id)
            .is_some_and(|current| Arc::ptr_eq(current, product))
        {
            return;
        }
        versions.remove(&product.version_id);
        let survivor = self.entries.values().rev().find_map(|entry| {
            entry.as_product().filter(|p: &&Arc<ProductTocEntry>| {
                p.kind_id == product.kind_id
                    && p.version_id == product.version_id
                    && !Arc::ptr_eq(*p, product)
            })
        });
        if let Some(survivor) = survivor {
            versions.insert(product.version_id.clone(), Arc::clone(survivor));
        }
        if versions.is_empty() {
            self.products_by_kind.remove(&product.kind_id);
        }
    }

    fn unlink_custom(&mut self, custom: &Arc<CustomTocEntry>) {
        let Some(by_name) = self.custom.get_mut(&custom.tag) else {
            return;
        };
        let name = &custom.base.qualified_name;
        if !by_name.get(name).is_some_and(|current| Arc::ptr_eq(current, custom)) {
            return;
        }
        by_name.remove(name);
        let survivor = self.entries.values().rev().find_map(|entry| match entry {
            TocEntry::Custom(c)
                if c.tag == custom.tag && c.base.qualified_name == *name && !Arc::ptr_eq(c, custom) =>
            {
                Some(c)
            }
            _ => None,
        });
        if let Some(survivor) = survivor {
            by_name.insert(name.clone(), Arc::clone(survivor));
        }
        if by_name.is_empty() {
            self.custom.remove(&custom.tag);
        }
    }
}

/// Consistent copy of an index's entries, taken under one read lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocSnapshot {
    pub product_data_version: String,
    pub entries: Vec<TocEntry>,
}

/// Index over the entries of one product data release.
///
/// Built once by a [`TocLoader`](super::TocLoader) or by hand with
/// [`add_entry`](Self::add_entry), then queried from any number of threads.
/// Only indexes created with [`modifiable`](Self::modifiable) accept
/// [`remove_entry`](Self::remove_entry).
#[derive(Debug)]
pub struct TableOfContents {
    product_data_version: String,
    modifiable: bool,
    tables: RwLock<TocTables>,
}

impl TableOfContents {
    /// A read-only index.
    pub fn readonly(product_data_version: impl Into<String>) -> Self {
        Self::with_mode(product_data_version.into(), false)
    }

    /// An index that also supports removal.
    pub fn modifiable(product_data_version: impl Into<String>) -> Self {
        Self::with_mode(product_data_version.into(), true)
    }

    fn with_mode(product_data_version: String, modifiable: bool) -> Self {
        Self {
            product_data_version,
            modifiable,
            tables: RwLock::new(TocTables::default()),
        }
    }

    pub fn product_data_version(&self) -> &str {
        &self.product_data_version
    }

    pub const fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TocTables> {
        self.tables.read().expect("toc lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, TocTables> {
        self.tables.write().expect("toc lock poisoned")
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Insert an entry into every lookup structure of its kind. An entry with
    /// the same tag and id is replaced.
    pub fn add_entry(&self, entry: TocEntry) {
        tracing::debug!(entry = %entry.key(), "adding toc entry");
        self.write().insert(entry);
    }

    /// Remove an entry from every lookup structure. Returns whether it was
    /// present.
    ///
    /// Fails with [`TocError::Unsupported`] on read-only indexes.
    pub fn remove_entry(&self, entry: &TocEntry) -> Result<bool> {
        if !self.modifiable {
            return Err(TocError::unsupported(format!(
                "cannot remove {} from a read-only table of contents",
                entry.key()
            )));
        }
        let removed = self.write().remove(&entry.key()).is_some();
        tracing::debug!(entry = %entry.key(), removed, "removing toc entry");
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Product queries
    // ------------------------------------------------------------------------

    /// Product entry by id.
    pub fn entry_by_id(&self, id: &str) -> Option<Arc<ProductTocEntry>> {
        self.read().products_by_id.get(id).cloned()
    }

    /// Product entry by qualified name.
    pub fn entry_by_qualified_name(&self, qualified_name: &str) -> Option<Arc<ProductTocEntry>> {
        self.read().products_by_name.get(qualified_name).cloned()
    }

    /// Product entry by kind id and version id.
    ///
    /// A missing kind id yields `Ok(None)`. A kind id without a version id is
    /// rejected: the caller must name the version explicitly rather than get
    /// an arbitrary one.
    pub fn entry(
        &self,
        kind_id: Option<&str>,
        version_id: Option<&str>,
    ) -> Result<Option<Arc<ProductTocEntry>>> {
        let Some(kind_id) = kind_id else {
            return Ok(None);
        };
        let Some(version_id) = version_id else {
            return Err(QueryErrorKind::MissingVersionId {
                kind_id: kind_id.to_string(),
            }
            .into());
        };
        Ok(self
            .read()
            .products_by_kind
            .get(kind_id)
            .and_then(|versions| versions.get(version_id))
            .cloned())
    }

    /// All versions of a product kind, ordered by version id.
    pub fn entries_for_kind(&self, kind_id: &str) -> Vec<Arc<ProductTocEntry>> {
        self.read()
            .products_by_kind
            .get(kind_id)
            .map(|versions| versions.values().cloned().collect())
            .unwrap_or_default()
    }

    /// All product entries, in insertion order.
    pub fn product_entries(&self) -> Vec<Arc<ProductTocEntry>> {
        self.read()
            .entries
            .values()
            .filter_map(|entry| entry.as_product().cloned())
            .collect()
    }

    /// Distinct kind ids, sorted.
    pub fn kind_ids(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.read().products_by_kind.keys().cloned().collect();
        kinds.sort_unstable();
        kinds
    }

    // ------------------------------------------------------------------------
    // Other entry kinds
    // ------------------------------------------------------------------------

    pub fn table_entry(&self, qualified_name: &str) -> Option<Arc<TocEntryBase>> {
        self.read().tables.get(qualified_name).cloned()
    }

    /// Table contents by implementation type. Only meaningful for table
    /// structures with a single content; the first match in insertion order
    /// wins.
    pub fn table_entry_by_implementation_type(&self, implementation_type: &str) -> Option<Arc<TocEntryBase>> {
        self.read().entries.values().find_map(|entry| match entry {
            TocEntry::Table(b) if b.implementation_type == implementation_type => Some(Arc::clone(b)),
            _ => None,
        })
    }

    pub fn test_case_entry(&self, qualified_name: &str) -> Option<Arc<TocEntryBase>> {
        self.read().test_cases.get(qualified_name).cloned()
    }

    pub fn model_type_entry(&self, implementation_type: &str) -> Option<Arc<ModelTypeTocEntry>> {
        self.read().model_types.get(implementation_type).cloned()
    }

    /// All model type entries, in insertion order.
    pub fn model_type_entries(&self) -> Vec<Arc<ModelTypeTocEntry>> {
        self.read()
            .entries
            .values()
            .filter_map(|entry| match entry {
                TocEntry::ModelType(m) => Some(Arc::clone(m)),
                _ => None,
            })
            .collect()
    }

    pub fn enum_content_entry(&self, implementation_type: &str) -> Option<Arc<TocEntryBase>> {
        self.read().enum_contents.get(implementation_type).cloned()
    }

    pub fn enum_xml_adapter_entry(&self, implementation_type: &str) -> Option<Arc<TocEntryBase>> {
        self.read().enum_xml_adapters.get(implementation_type).cloned()
    }

    /// All enum XML adapter entries, in insertion order.
    pub fn enum_xml_adapter_entries(&self) -> Vec<Arc<TocEntryBase>> {
        self.read()
            .entries
            .values()
            .filter_map(|entry| match entry {
                TocEntry::EnumXmlAdapter(b) => Some(Arc::clone(b)),
                _ => None,
            })
            .collect()
    }

    /// Extension entry by tag and qualified name.
    pub fn custom_entry(&self, tag: &str, qualified_name: &str) -> Option<Arc<CustomTocEntry>> {
        self.read()
            .custom
            .get(tag)
            .and_then(|by_name| by_name.get(qualified_name))
            .cloned()
    }

    // ------------------------------------------------------------------------
    // Whole-index views
    // ------------------------------------------------------------------------

    /// Any entry by tag and id.
    pub fn get(&self, tag: &str, id: &str) -> Option<TocEntry> {
        let key = EntryKey {
            tag: tag.to_string(),
            id: id.to_string(),
        };
        self.read().entries.get(&key).cloned()
    }

    /// Snapshot of every entry, in insertion order.
    pub fn entries(&self) -> Vec<TocEntry> {
        self.read().entries.values().cloned().collect()
    }

    /// Copy of the version and all entries, in insertion order.
    pub fn snapshot(&self) -> TocSnapshot {
        TocSnapshot {
            product_data_version: self.product_data_version.clone(),
            entries: self.entries(),
        }
    }

    /// Entry count per tag, sorted by tag.
    pub fn counts_by_tag(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.read().entries.values() {
            *counts.entry(entry.tag().to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::entry::ModelTypeCategory;
    use crate::toc::generation::{parse_instant, GenerationTocEntry};
    use indexmap::IndexMap;

    fn product(id: &str, kind: &str, version: &str) -> TocEntry {
        TocEntry::product(
            ProductTocEntry::new(
                TocEntryBase::new(id, format!("products.{id}"), format!("{id}.xml"), "org.Product"),
                kind,
                version,
            )
            .with_generation(GenerationTocEntry::new(
                parse_instant("2024-01-01").expect("date"),
            )),
        )
    }

    #[test]
    fn test_product_lookups() {
        let toc = TableOfContents::readonly("1.0");
        toc.add_entry(product("motor.2024-01", "Motor", "2024-01"));
        toc.add_entry(product("motor.2024-07", "Motor", "2024-07"));

        assert!(toc.entry_by_id("motor.2024-01").is_some());
        assert!(toc.entry_by_qualified_name("products.motor.2024-07").is_some());
        let found = toc.entry(Some("Motor"), Some("2024-07")).expect("valid query");
        assert_eq!(found.map(|p| p.base.id.clone()).as_deref(), Some("motor.2024-07"));
        assert_eq!(toc.entries_for_kind("Motor").len(), 2);
        assert!(toc.entries_for_kind("Boat").is_empty());
        assert_eq!(toc.kind_ids(), ["Motor"]);
    }

    #[test]
    fn test_entry_query_contract() {
        let toc = TableOfContents::readonly("1.0");
        toc.add_entry(product("motor.2024-01", "Motor", "2024-01"));

        assert!(toc.entry(None, Some("2024-01")).expect("valid").is_none());
        assert!(toc.entry(None, None).expect("valid").is_none());
        assert!(matches!(
            toc.entry(Some("Motor"), None),
            Err(TocError::Query(QueryErrorKind::MissingVersionId { .. }))
        ));
        assert!(toc.entry(Some("Motor"), Some("1999")).expect("valid").is_none());
    }

    #[test]
    fn test_add_is_idempotent() {
        let toc = TableOfContents::readonly("1.0");
        let entry = product("motor.2024-01", "Motor", "2024-01");
        toc.add_entry(entry.clone());
        toc.add_entry(entry);

        assert_eq!(toc.len(), 1);
        assert_eq!(toc.entries_for_kind("Motor").len(), 1);
        assert_eq!(toc.product_entries().len(), 1);
    }

    #[test]
    fn test_replacement_unlinks_old_keys() {
        let toc = TableOfContents::modifiable("1.0");
        toc.add_entry(product("motor.a", "Motor", "2024-01"));
        // Same identity, moved to another version.
        toc.add_entry(product("motor.a", "Motor", "2024-07"));

        assert!(toc.entry(Some("Motor"), Some("2024-01")).expect("valid").is_none());
        assert!(toc.entry(Some("Motor"), Some("2024-07")).expect("valid").is_some());
        assert_eq!(toc.len(), 1);
    }

    #[test]
    fn test_remove_updates_every_structure() {
        let toc = TableOfContents::modifiable("1.0");
        let entry = product("motor.2024-01", "Motor", "2024-01");
        toc.add_entry(entry.clone());

        assert!(toc.remove_entry(&entry).expect("modifiable"));
        assert!(!toc.remove_entry(&entry).expect("modifiable"));
        assert!(toc.entry_by_id("motor.2024-01").is_none());
        assert!(toc.entry_by_qualified_name("products.motor.2024-01").is_none());
        assert!(toc.entries_for_kind("Motor").is_empty());
        assert!(toc.kind_ids().is_empty());
        assert!(toc.is_empty());
    }

    fn named(id: &str, qualified_name: &str, version: &str) -> TocEntry {
        TocEntry::product(ProductTocEntry::new(
            TocEntryBase::new(id, qualified_name, format!("{id}.xml"), "org.Product"),
            "Motor",
            version,
        ))
    }

    #[test]
    fn test_remove_after_name_collision_restores_survivor() {
        let toc = TableOfContents::modifiable("1.0");
        let a = named("motor.a", "products.Motor", "2024-01");
        let b = named("motor.b", "products.Motor", "2024-01");
        toc.add_entry(a);
        toc.add_entry(b.clone());
        assert_eq!(
            toc.entry_by_qualified_name("products.Motor").map(|p| p.base.id.clone()).as_deref(),
            Some("motor.b")
        );

        assert!(toc.remove_entry(&b).expect("modifiable"));
        let by_name = toc.entry_by_qualified_name("products.Motor").expect("survivor by name");
        assert_eq!(by_name.base.id, "motor.a");
        let by_version = toc.entry(Some("Motor"), Some("2024-01")).expect("valid").expect("survivor by version");
        assert_eq!(by_version.base.id, "motor.a");
        assert!(toc.entry_by_id("motor.a").is_some());
    }

    #[test]
    fn test_remove_of_shadowed_entry_keeps_latest() {
        let toc = TableOfContents::modifiable("1.0");
        let a = named("motor.a", "products.Motor", "2024-01");
        toc.add_entry(a.clone());
        toc.add_entry(named("motor.b", "products.Motor", "2024-01"));

        assert!(toc.remove_entry(&a).expect("modifiable"));
        assert_eq!(
            toc.entry_by_qualified_name("products.Motor").map(|p| p.base.id.clone()).as_deref(),
            Some("motor.b")
        );
        assert_eq!(toc.entries_for_kind("Motor").len(), 1);
    }

    #[test]
    fn test_side_table_collision_restores_survivor() {
        let toc = TableOfContents::modifiable("1.0");
        let first = TocEntry::table(TocEntryBase::new("t1", "tables.Rates", "t1.xml", "org.Rates"));
        let second = TocEntry::table(TocEntryBase::new("t2", "tables.Rates", "t2.xml", "org.Rates"));
        toc.add_entry(first);
        toc.add_entry(second.clone());

        assert!(toc.remove_entry(&second).expect("modifiable"));
        assert_eq!(toc.table_entry("tables.Rates").map(|t| t.id.clone()).as_deref(), Some("t1"));
    }

    #[test]
    fn test_remove_on_readonly_fails() {
        let toc = TableOfContents::readonly("1.0");
        let entry = product("motor.2024-01", "Motor", "2024-01");
        toc.add_entry(entry.clone());

        assert!(matches!(toc.remove_entry(&entry), Err(TocError::Unsupported(_))));
        assert_eq!(toc.len(), 1);
    }

    #[test]
    fn test_side_tables() {
        let toc = TableOfContents::modifiable("1.0");
        toc.add_entry(TocEntry::table(TocEntryBase::new("t1", "tables.Rates", "t1.xml", "org.Rates")));
        toc.add_entry(TocEntry::test_case(TocEntryBase::new("tc", "tests.Smoke", "tc.xml", "org.Test")));
        toc.add_entry(TocEntry::model_type(
            TocEntryBase::new("Policy", "model.Policy", "", "org.Policy"),
            ModelTypeCategory::Policy,
        ));
        toc.add_entry(TocEntry::enum_content(TocEntryBase::new("e", "enums.Colour", "e.xml", "org.Colour")));
        toc.add_entry(TocEntry::enum_xml_adapter(TocEntryBase::new("a", "adapters.Colour", "", "org.ColourAdapter")));
        let custom = TocEntry::custom(
            "Formula",
            TocEntryBase::new("f", "calc.Premium", "", "org.Premium"),
            IndexMap::new(),
        );
        toc.add_entry(custom.clone());

        assert!(toc.table_entry("tables.Rates").is_some());
        assert!(toc.table_entry_by_implementation_type("org.Rates").is_some());
        assert!(toc.test_case_entry("tests.Smoke").is_some());
        assert!(toc.model_type_entry("org.Policy").is_some());
        assert_eq!(toc.model_type_entries().len(), 1);
        assert!(toc.enum_content_entry("org.Colour").is_some());
        assert!(toc.enum_xml_adapter_entry("org.ColourAdapter").is_some());
        assert_eq!(toc.enum_xml_adapter_entries().len(), 1);
        assert!(toc.custom_entry("Formula", "calc.Premium").is_some());
        assert!(toc.get("TableContents", "t1").is_some());
        assert!(toc.entry_by_id("t1").is_none(), "tables are not products");

        assert!(toc.remove_entry(&custom).expect("modifiable"));
        assert!(toc.custom_entry("Formula", "calc.Premium").is_none());

        let counts = toc.counts_by_tag();
        assert_eq!(counts.get("TableContents"), Some(&1));
        assert_eq!(counts.get("Formula"), None);
    }

    #[test]
    fn test_concurrent_readers_see_complete_versions() {
        let toc = Arc::new(TableOfContents::modifiable("1.0"));
        let first = product("motor.2024-01", "Motor", "2024-01");
        toc.add_entry(first);

        std::thread::scope(|scope| {
            let writer = Arc::clone(&toc);
            scope.spawn(move || {
                for i in 0..200 {
                    let entry = product(&format!("motor.x{i}"), "Motor", &format!("x{i:03}"));
                    writer.add_entry(entry.clone());
                    writer.remove_entry(&entry).expect("modifiable");
                }
            });
            for _ in 0..4 {
                let reader = Arc::clone(&toc);
                scope.spawn(move || {
                    for _ in 0..200 {
                        let versions = reader.entries_for_kind("Motor");
                        assert!(!versions.is_empty() && versions.len() <= 2);
                        assert!(versions.iter().all(|p| p.kind_id == "Motor"));
                    }
                });
            }
        });

        assert_eq!(toc.entries_for_kind("Motor").len(), 1);
    }
}
