//! Delta computation driver.
//!
//! [`DeltaContext`] carries the options of one comparison call and the path
//! of object pairs currently being compared. Entering a pair that is already
//! on the path means the object graph has a cycle, which is reported as
//! [`DeltaErrorKind::CyclicGraph`] instead of recursing forever.

use super::node::{DeltaKind, ModelObjectDelta};
use super::object::{object_identity, AssociationKind, ModelObject, ObjectIdentity};
use super::options::{ComputationMethod, DeltaComputationOptions};
use crate::error::{DeltaErrorKind, Result};

/// Compare two object graphs.
///
/// Either side may be absent, giving an added or removed root delta; both
/// absent is a contract violation.
pub fn compute_delta<'a>(
    original: Option<&'a dyn ModelObject>,
    reference: Option<&'a dyn ModelObject>,
    options: &dyn DeltaComputationOptions,
) -> Result<ModelObjectDelta<'a>> {
    DeltaContext::new(options).new_delta(original, reference, None, AssociationKind::Composition)
}

/// State of one comparison call.
pub struct DeltaContext<'o> {
    options: &'o dyn DeltaComputationOptions,
    /// (original, reference) identities of the pairs being compared
    path: Vec<(ObjectIdentity, ObjectIdentity)>,
}

impl<'o> DeltaContext<'o> {
    pub fn new(options: &'o dyn DeltaComputationOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
        }
    }

    pub fn options(&self) -> &'o dyn DeltaComputationOptions {
        self.options
    }

    /// Compare two present objects, guarding against cycles.
    pub fn compare<'a>(
        &mut self,
        original: &'a dyn ModelObject,
        reference: &'a dyn ModelObject,
        association: Option<&str>,
    ) -> Result<ModelObjectDelta<'a>> {
        let pair = (object_identity(original), object_identity(reference));
        if self.path.contains(&pair) {
            return Err(DeltaErrorKind::CyclicGraph {
                type_name: original.type_name().to_string(),
                association: association.unwrap_or_default().to_string(),
            }
            .into());
        }
        self.path.push(pair);
        let delta = original.compute_delta(reference, self);
        self.path.pop();
        delta
    }

    /// Delta for any combination of present and absent objects.
    pub fn new_delta<'a>(
        &mut self,
        original: Option<&'a dyn ModelObject>,
        reference: Option<&'a dyn ModelObject>,
        association: Option<&str>,
        association_kind: AssociationKind,
    ) -> Result<ModelObjectDelta<'a>> {
        match (original, reference) {
            (None, None) => Err(DeltaErrorKind::NoAnchorObject.into()),
            (Some(original), None) => self.one_sided(original, DeltaKind::Removed, association, association_kind),
            (None, Some(reference)) => self.one_sided(reference, DeltaKind::Added, association, association_kind),
            (Some(original), Some(reference)) => {
                let mut delta = self.compare(original, reference, association)?;
                if let Some(association) = association {
                    delta.set_association(association, association_kind);
                }
                Ok(delta)
            }
        }
    }

    fn one_sided<'a>(
        &mut self,
        object: &'a dyn ModelObject,
        kind: DeltaKind,
        association: Option<&str>,
        association_kind: AssociationKind,
    ) -> Result<ModelObjectDelta<'a>> {
        let mut path: Vec<ObjectIdentity> = self.path.iter().map(|(original, reference)| match kind {
            DeltaKind::Removed => *original,
            _ => *reference,
        }).collect();
        ModelObjectDelta::one_sided(object, kind, association, association_kind, self.options, &mut path)
    }

    /// Compare the children of a to-many association and attach the
    /// resulting deltas to `parent`.
    pub fn compute_child_deltas<'a>(
        &mut self,
        parent: &mut ModelObjectDelta<'a>,
        association: &str,
        association_kind: AssociationKind,
        originals: &[&'a dyn ModelObject],
        references: &[&'a dyn ModelObject],
    ) -> Result<()> {
        if self.skips_association(parent, association) {
            return Ok(());
        }
        match self.options.method(association) {
            ComputationMethod::ByPosition => {
                self.children_by_position(parent, association, association_kind, originals, references)
            }
            ComputationMethod::ByObject => {
                self.children_by_object(parent, association, association_kind, originals, references)
            }
        }
    }

    /// Compare the child of a to-one association.
    pub fn compute_single_child_delta<'a>(
        &mut self,
        parent: &mut ModelObjectDelta<'a>,
        association: &str,
        association_kind: AssociationKind,
        original: Option<&'a dyn ModelObject>,
        reference: Option<&'a dyn ModelObject>,
    ) -> Result<()> {
        if self.skips_association(parent, association) {
            return Ok(());
        }
        self.pair(parent, association, association_kind, original, reference)
    }

    fn skips_association(&self, parent: &ModelObjectDelta<'_>, association: &str) -> bool {
        self.options.ignore_associations()
            || parent.is_class_changed()
            || parent
                .type_name()
                .is_some_and(|type_name| self.options.ignore(type_name, association))
    }

    fn children_by_position<'a>(
        &mut self,
        parent: &mut ModelObjectDelta<'a>,
        association: &str,
        association_kind: AssociationKind,
        originals: &[&'a dyn ModelObject],
        references: &[&'a dyn ModelObject],
    ) -> Result<()> {
        for i in 0..originals.len().max(references.len()) {
            let original = originals.get(i).copied();
            let reference = references.get(i).copied();
            self.pair(parent, association, association_kind, original, reference)?;
        }
        Ok(())
    }

    fn children_by_object<'a>(
        &mut self,
        parent: &mut ModelObjectDelta<'a>,
        association: &str,
        association_kind: AssociationKind,
        originals: &[&'a dyn ModelObject],
        references: &[&'a dyn ModelObject],
    ) -> Result<()> {
        let mut matched = vec![false; references.len()];
        for &original in originals {
            let found = references
                .iter()
                .enumerate()
                .find(|(i, reference)| !matched[*i] && self.options.is_same(original, **reference));
            let reference = match found {
                Some((i, reference)) => {
                    matched[i] = true;
                    Some(*reference)
                }
                None => None,
            };
            let delta = self.new_delta(Some(original), reference, Some(association), association_kind)?;
            parent.add_child_delta(delta);
        }
        for (reference, _) in references.iter().zip(&matched).filter(|(_, matched)| !**matched) {
            let delta = self.new_delta(None, Some(*reference), Some(association), association_kind)?;
            parent.add_child_delta(delta);
        }
        Ok(())
    }

    /// Delta for one original/reference slot. Present objects that are not
    /// the same entity are reported as a removal followed by an addition.
    fn pair<'a>(
        &mut self,
        parent: &mut ModelObjectDelta<'a>,
        association: &str,
        association_kind: AssociationKind,
        original: Option<&'a dyn ModelObject>,
        reference: Option<&'a dyn ModelObject>,
    ) -> Result<()> {
        match (original, reference) {
            (None, None) => {}
            (Some(o), Some(r)) if !self.options.is_same(o, r) => {
                let removed = self.new_delta(Some(o), None, Some(association), association_kind)?;
                parent.add_child_delta(removed);
                let added = self.new_delta(None, Some(r), Some(association), association_kind)?;
                parent.add_child_delta(added);
            }
            (original, reference) => {
                let delta = self.new_delta(original, reference, Some(association), association_kind)?;
                parent.add_child_delta(delta);
            }
        }
        Ok(())
    }
}
