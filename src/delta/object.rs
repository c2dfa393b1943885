//! The comparison contract implemented by configured entities.

use super::compute::DeltaContext;
use super::node::ModelObjectDelta;
use crate::error::Result;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;

/// Classification of a parent-child relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    /// The parent owns the child
    Composition,
    /// The parent merely refers to the child
    Association,
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composition => write!(f, "composition"),
            Self::Association => write!(f, "association"),
        }
    }
}

/// The children an object holds under one association.
pub struct ChildAssociation<'a> {
    pub name: String,
    pub kind: AssociationKind,
    pub children: Vec<&'a dyn ModelObject>,
}

impl<'a> ChildAssociation<'a> {
    pub fn new(name: impl Into<String>, kind: AssociationKind, children: Vec<&'a dyn ModelObject>) -> Self {
        Self {
            name: name.into(),
            kind,
            children,
        }
    }
}

/// A configured business entity that can be compared structurally.
///
/// Implementations build their delta in [`compute_delta`](Self::compute_delta):
///
/// 1. start from [`ModelObjectDelta::new_empty`]
/// 2. call [`ModelObjectDelta::check_property_change`] once per attribute
/// 3. hand each child association to
///    [`DeltaContext::compute_child_deltas`] or
///    [`DeltaContext::compute_single_child_delta`]
pub trait ModelObject {
    /// Concrete kind of the object. Objects whose kinds differ are reported
    /// as class changed.
    fn type_name(&self) -> &str;

    /// Stable identity used to pair children by object.
    fn object_id(&self) -> Option<String> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    /// Compare `self` (the original) against `reference`.
    fn compute_delta<'a>(
        &'a self,
        reference: &'a dyn ModelObject,
        ctx: &mut DeltaContext<'_>,
    ) -> Result<ModelObjectDelta<'a>>;

    /// Children per association. Used to expand subtree deltas for added and
    /// removed objects.
    fn child_associations(&self) -> Vec<ChildAssociation<'_>> {
        Vec::new()
    }

    /// Short human-readable label.
    fn label(&self) -> String {
        match self.object_id() {
            Some(id) => format!("{} {id}", self.type_name()),
            None => self.type_name().to_string(),
        }
    }
}

/// Upcast a slice of concrete objects for the child delta helpers.
pub fn as_model_objects<'a, T: ModelObject + 'a>(items: &'a [T]) -> Vec<&'a dyn ModelObject> {
    items.iter().map(|item| item as &dyn ModelObject).collect()
}

/// Identity of an object for cycle detection: its address plus its concrete
/// type, since a child stored at offset 0 shares its parent's address.
pub(crate) type ObjectIdentity = (usize, TypeId);

pub(crate) fn object_identity(object: &dyn ModelObject) -> ObjectIdentity {
    let address = object as *const _ as *const () as usize;
    (address, Any::type_id(object.as_any()))
}
