//! Delta nodes: the result tree of a structural comparison.

use super::object::{object_identity, AssociationKind, ModelObject, ObjectIdentity};
use super::options::DeltaComputationOptions;
use crate::error::{DeltaErrorKind, Result};
use indexmap::IndexSet;
use serde::ser::{Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// What happened to the object a delta describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaKind {
    /// Nothing changed
    Empty,
    /// The object exists on both sides and differs
    Changed,
    /// The object only exists in the reference
    Added,
    /// The object only exists in the original
    Removed,
}

impl fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Changed => "changed",
            Self::Added => "added",
            Self::Removed => "removed",
        };
        f.write_str(name)
    }
}

/// Set of change flags of a changed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindOfChange(u8);

impl KindOfChange {
    pub const EMPTY: Self = Self(0);
    /// Original and reference are of different concrete kinds
    pub const CLASS_CHANGED: Self = Self(1);
    /// At least one of the object's own properties differs
    pub const PROPERTY_CHANGED: Self = Self(1 << 1);
    /// A child was added or removed
    pub const STRUCTURE_CHANGED: Self = Self(1 << 2);
    /// A child changed
    pub const CHILD_CHANGED: Self = Self(1 << 3);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::CLASS_CHANGED, "class-changed"),
        (Self::PROPERTY_CHANGED, "property-changed"),
        (Self::STRUCTURE_CHANGED, "structure-changed"),
        (Self::CHILD_CHANGED, "child-changed"),
    ];

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the set flags.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for KindOfChange {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for KindOfChange {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Serialize for KindOfChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

/// One comparison result between an original and a reference object.
///
/// A node only grows through [`mark_property_changed`] and
/// [`add_child_delta`]; once it reports a change it never becomes empty
/// again. Class-changed nodes are terminal.
///
/// [`mark_property_changed`]: Self::mark_property_changed
/// [`add_child_delta`]: Self::add_child_delta
pub struct ModelObjectDelta<'a> {
    original: Option<&'a dyn ModelObject>,
    reference: Option<&'a dyn ModelObject>,
    kind: DeltaKind,
    kind_of_change: KindOfChange,
    association: Option<String>,
    association_kind: Option<AssociationKind>,
    /// Most recently marked first
    changed_properties: IndexSet<String>,
    children: Vec<ModelObjectDelta<'a>>,
}

impl<'a> ModelObjectDelta<'a> {
    fn with_objects(
        original: Option<&'a dyn ModelObject>,
        reference: Option<&'a dyn ModelObject>,
        kind: DeltaKind,
    ) -> Self {
        Self {
            original,
            reference,
            kind,
            kind_of_change: KindOfChange::EMPTY,
            association: None,
            association_kind: None,
            changed_properties: IndexSet::new(),
            children: Vec::new(),
        }
    }

    /// Delta between two versions of the same logical entity.
    ///
    /// Starts out empty unless the objects are of different concrete kinds,
    /// in which case it is created changed with
    /// [`KindOfChange::CLASS_CHANGED`].
    pub fn new_empty(original: &'a dyn ModelObject, reference: &'a dyn ModelObject) -> Self {
        let mut delta = Self::with_objects(Some(original), Some(reference), DeltaKind::Empty);
        if original.type_name() != reference.type_name() {
            delta.kind = DeltaKind::Changed;
            delta.kind_of_change = KindOfChange::CLASS_CHANGED;
        }
        delta
    }

    /// Delta for a child that only exists in the reference.
    pub fn new_add_delta(
        reference: &'a dyn ModelObject,
        association: &str,
        association_kind: AssociationKind,
        options: &dyn DeltaComputationOptions,
    ) -> Result<Self> {
        let mut path = Vec::new();
        Self::one_sided(reference, DeltaKind::Added, Some(association), association_kind, options, &mut path)
    }

    /// Delta for a child that only exists in the original.
    pub fn new_remove_delta(
        original: &'a dyn ModelObject,
        association: &str,
        association_kind: AssociationKind,
        options: &dyn DeltaComputationOptions,
    ) -> Result<Self> {
        let mut path = Vec::new();
        Self::one_sided(original, DeltaKind::Removed, Some(association), association_kind, options, &mut path)
    }

    /// Added or removed delta, expanded over the object's subtree when the
    /// options ask for it.
    pub(crate) fn one_sided(
        object: &'a dyn ModelObject,
        kind: DeltaKind,
        association: Option<&str>,
        association_kind: AssociationKind,
        options: &dyn DeltaComputationOptions,
        path: &mut Vec<ObjectIdentity>,
    ) -> Result<Self> {
        let mut delta = match kind {
            DeltaKind::Removed => Self::with_objects(Some(object), None, kind),
            _ => Self::with_objects(None, Some(object), kind),
        };
        delta.association = association.map(str::to_string);
        delta.association_kind = Some(association_kind);

        if !options.create_subtree_delta() || options.ignore_associations() {
            return Ok(delta);
        }
        let identity = object_identity(object);
        if path.contains(&identity) {
            return Err(DeltaErrorKind::CyclicGraph {
                type_name: object.type_name().to_string(),
                association: association.unwrap_or_default().to_string(),
            }
            .into());
        }
        path.push(identity);
        for child_association in object.child_associations() {
            if options.ignore(object.type_name(), &child_association.name) {
                continue;
            }
            for child in child_association.children {
                let child_delta = Self::one_sided(
                    child,
                    kind,
                    Some(&child_association.name),
                    child_association.kind,
                    options,
                    path,
                )?;
                delta.add_child_delta(child_delta);
            }
        }
        path.pop();
        Ok(delta)
    }

    /// Compare one property and mark it changed if the values differ.
    ///
    /// Ignored properties are skipped. The options' equality override wins
    /// over `==`; it receives the values as `&dyn Any`, which is why `T`
    /// must be `'static`. Pass owned field values (`&self.name` for a
    /// `String` field) or use
    /// [`check_str_property_change`](Self::check_str_property_change) for
    /// borrowed text.
    pub fn check_property_change<T>(
        &mut self,
        property: &str,
        old: &T,
        new: &T,
        options: &dyn DeltaComputationOptions,
    ) where
        T: PartialEq + Any,
    {
        let type_name = self.type_name().unwrap_or_default().to_string();
        if options.ignore(&type_name, property) {
            return;
        }
        let equal = options
            .are_values_equal(&type_name, property, old, new)
            .unwrap_or_else(|| old == new);
        if !equal {
            self.mark_property_changed(property);
        }
    }

    /// [`check_property_change`](Self::check_property_change) for borrowed
    /// strings. An equality override sees both values as `String`.
    pub fn check_str_property_change(
        &mut self,
        property: &str,
        old: &str,
        new: &str,
        options: &dyn DeltaComputationOptions,
    ) {
        self.check_property_change(property, &old.to_owned(), &new.to_owned(), options);
    }

    /// Record a changed property. Marking a name again moves it to the
    /// front.
    pub fn mark_property_changed(&mut self, property: &str) {
        if self.is_class_changed() {
            tracing::trace!(property, "ignoring property change on class-changed delta");
            return;
        }
        self.changed_properties.shift_remove(property);
        self.changed_properties.shift_insert(0, property.to_string());
        self.kind_of_change |= KindOfChange::PROPERTY_CHANGED;
        self.mark_changed();
    }

    /// Attach a child delta. Empty children are dropped.
    pub fn add_child_delta(&mut self, child: ModelObjectDelta<'a>) {
        if child.is_empty() {
            return;
        }
        if self.is_class_changed() {
            tracing::trace!(child = %child.label(), "ignoring child delta on class-changed delta");
            return;
        }
        self.kind_of_change |= match child.kind {
            DeltaKind::Added | DeltaKind::Removed => KindOfChange::STRUCTURE_CHANGED,
            DeltaKind::Changed | DeltaKind::Empty => KindOfChange::CHILD_CHANGED,
        };
        self.mark_changed();
        self.children.push(child);
    }

    fn mark_changed(&mut self) {
        if self.kind == DeltaKind::Empty {
            self.kind = DeltaKind::Changed;
        }
    }

    pub(crate) fn set_association(&mut self, association: &str, kind: AssociationKind) {
        self.association = Some(association.to_string());
        self.association_kind = Some(kind);
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub const fn kind(&self) -> DeltaKind {
        self.kind
    }

    pub const fn kind_of_change(&self) -> KindOfChange {
        self.kind_of_change
    }

    pub fn is_empty(&self) -> bool {
        self.kind == DeltaKind::Empty
    }

    pub fn is_added(&self) -> bool {
        self.kind == DeltaKind::Added
    }

    pub fn is_removed(&self) -> bool {
        self.kind == DeltaKind::Removed
    }

    pub fn is_changed(&self) -> bool {
        self.kind == DeltaKind::Changed
    }

    pub const fn is_class_changed(&self) -> bool {
        self.kind_of_change.contains(KindOfChange::CLASS_CHANGED)
    }

    pub const fn is_structure_changed(&self) -> bool {
        self.kind_of_change.contains(KindOfChange::STRUCTURE_CHANGED)
    }

    pub const fn is_child_changed(&self) -> bool {
        self.kind_of_change.contains(KindOfChange::CHILD_CHANGED)
    }

    /// Whether the named property was marked changed.
    pub fn is_property_changed(&self, property: &str) -> bool {
        self.changed_properties.contains(property)
    }

    /// Changed property names, most recently marked first.
    pub fn changed_properties(&self) -> Vec<&str> {
        self.changed_properties.iter().map(String::as_str).collect()
    }

    pub fn children(&self) -> &[ModelObjectDelta<'a>] {
        &self.children
    }

    pub fn original(&self) -> Option<&'a dyn ModelObject> {
        self.original
    }

    pub fn reference(&self) -> Option<&'a dyn ModelObject> {
        self.reference
    }

    pub fn association(&self) -> Option<&str> {
        self.association.as_deref()
    }

    pub const fn association_kind(&self) -> Option<AssociationKind> {
        self.association_kind
    }

    /// The object this delta is about: the original, or the reference for
    /// added deltas.
    pub fn object(&self) -> Option<&'a dyn ModelObject> {
        self.original.or(self.reference)
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.object().map(|object| object.type_name())
    }

    pub fn label(&self) -> String {
        self.object().map_or_else(String::new, |object| object.label())
    }

    /// Number of nodes in this tree, including the root.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ModelObjectDelta::node_count).sum::<usize>()
    }
}

impl fmt::Debug for ModelObjectDelta<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelObjectDelta")
            .field("original", &self.original.map(|o| o.label()))
            .field("reference", &self.reference.map(|o| o.label()))
            .field("kind", &self.kind)
            .field("kind_of_change", &self.kind_of_change.names())
            .field("association", &self.association)
            .field("changed_properties", &self.changed_properties)
            .field("children", &self.children)
            .finish()
    }
}
