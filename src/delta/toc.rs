//! Table of contents types as comparable model objects.
//!
//! A [`TocSnapshot`] owns its entries through the `entries` composition,
//! each product owns its generations through `generations`. Entries are
//! identified by tag and id, generations by their validity start.

use super::compute::DeltaContext;
use super::node::ModelObjectDelta;
use super::object::{AssociationKind, ChildAssociation, ModelObject};
use crate::error::Result;
use crate::toc::{format_instant, GenerationTocEntry, TocEntry, TocSnapshot, GENERATION_TAG, ROOT_TAG};
use std::any::Any;

pub const ENTRIES_ASSOCIATION: &str = "entries";
pub const GENERATIONS_ASSOCIATION: &str = "generations";

impl ModelObject for TocSnapshot {
    fn type_name(&self) -> &str {
        ROOT_TAG
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn compute_delta<'a>(
        &'a self,
        reference: &'a dyn ModelObject,
        ctx: &mut DeltaContext<'_>,
    ) -> Result<ModelObjectDelta<'a>> {
        let mut delta = ModelObjectDelta::new_empty(self, reference);
        let Some(other) = reference.as_any().downcast_ref::<TocSnapshot>() else {
            return Ok(delta);
        };
        delta.check_property_change(
            "productDataVersion",
            &self.product_data_version,
            &other.product_data_version,
            ctx.options(),
        );
        let originals = super::as_model_objects(&self.entries);
        let references = super::as_model_objects(&other.entries);
        ctx.compute_child_deltas(
            &mut delta,
            ENTRIES_ASSOCIATION,
            AssociationKind::Composition,
            &originals,
            &references,
        )?;
        Ok(delta)
    }

    fn child_associations(&self) -> Vec<ChildAssociation<'_>> {
        vec![ChildAssociation::new(
            ENTRIES_ASSOCIATION,
            AssociationKind::Composition,
            super::as_model_objects(&self.entries),
        )]
    }
}

impl ModelObject for TocEntry {
    fn type_name(&self) -> &str {
        self.tag()
    }

    fn object_id(&self) -> Option<String> {
        Some(self.id().to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn compute_delta<'a>(
        &'a self,
        reference: &'a dyn ModelObject,
        ctx: &mut DeltaContext<'_>,
    ) -> Result<ModelObjectDelta<'a>> {
        let mut delta = ModelObjectDelta::new_empty(self, reference);
        let Some(other) = reference.as_any().downcast_ref::<TocEntry>() else {
            return Ok(delta);
        };
        if delta.is_class_changed() {
            return Ok(delta);
        }
        let options = ctx.options();
        let (old, new) = (self.base(), other.base());
        delta.check_property_change("qualifiedName", &old.qualified_name, &new.qualified_name, options);
        delta.check_property_change("resource", &old.resource_ref, &new.resource_ref, options);
        delta.check_property_change(
            "implementationType",
            &old.implementation_type,
            &new.implementation_type,
            options,
        );

        match (self, other) {
            (TocEntry::Product(old), TocEntry::Product(new)) => {
                delta.check_property_change("kindId", &old.kind_id, &new.kind_id, options);
                delta.check_property_change("versionId", &old.version_id, &new.version_id, options);
                delta.check_property_change("validTo", &old.valid_to, &new.valid_to, options);
                delta.check_property_change(
                    "generationImplementationType",
                    &old.generation_implementation_type,
                    &new.generation_implementation_type,
                    options,
                );
                let originals: Vec<&dyn ModelObject> =
                    old.generations().iter().map(|g| g as &dyn ModelObject).collect();
                let references: Vec<&dyn ModelObject> =
                    new.generations().iter().map(|g| g as &dyn ModelObject).collect();
                ctx.compute_child_deltas(
                    &mut delta,
                    GENERATIONS_ASSOCIATION,
                    AssociationKind::Composition,
                    &originals,
                    &references,
                )?;
            }
            (TocEntry::Custom(old), TocEntry::Custom(new)) => {
                let mut keys: Vec<&String> = old.attributes.keys().collect();
                keys.extend(new.attributes.keys().filter(|k| !old.attributes.contains_key(*k)));
                for key in keys {
                    delta.check_property_change(
                        key,
                        &old.attributes.get(key).cloned(),
                        &new.attributes.get(key).cloned(),
                        options,
                    );
                }
            }
            _ => {}
        }
        Ok(delta)
    }

    fn child_associations(&self) -> Vec<ChildAssociation<'_>> {
        match self.as_product() {
            Some(product) => vec![ChildAssociation::new(
                GENERATIONS_ASSOCIATION,
                AssociationKind::Composition,
                product.generations().iter().map(|g| g as &dyn ModelObject).collect(),
            )],
            None => Vec::new(),
        }
    }
}

impl ModelObject for GenerationTocEntry {
    fn type_name(&self) -> &str {
        GENERATION_TAG
    }

    fn object_id(&self) -> Option<String> {
        Some(format_instant(self.valid_from))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn compute_delta<'a>(
        &'a self,
        reference: &'a dyn ModelObject,
        ctx: &mut DeltaContext<'_>,
    ) -> Result<ModelObjectDelta<'a>> {
        let mut delta = ModelObjectDelta::new_empty(self, reference);
        if let Some(other) = reference.as_any().downcast_ref::<GenerationTocEntry>() {
            delta.check_property_change("validFrom", &self.valid_from, &other.valid_from, ctx.options());
            delta.check_property_change(
                "implementationType",
                &self.implementation_type,
                &other.implementation_type,
                ctx.options(),
            );
        }
        Ok(delta)
    }
}
