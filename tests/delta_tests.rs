//! Integration tests for the structural delta engine
//!
//! Two fixture releases are compared as model object graphs, and a small
//! hand-written model exercises the engine's contract directly.

use product_runtime::delta::{
    as_model_objects, compute_delta, AssociationKind, ChildAssociation, ComputationMethod,
    DefaultDeltaOptions, DeltaContext, DeltaKind, DeltaVisitor, KindOfChange, LabelCollector,
    ModelObject, ModelObjectDelta, ENTRIES_ASSOCIATION, GENERATIONS_ASSOCIATION,
};
use product_runtime::error::{DeltaErrorKind, Result, TocError};
use product_runtime::toc::{TableOfContents, TocSnapshot};
use std::any::Any;
use std::path::Path;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn snapshot(name: &str) -> TocSnapshot {
    TableOfContents::load_from_path(Path::new(FIXTURES_DIR).join(name))
        .expect("fixture loads")
        .snapshot()
}

fn diff<'a>(
    old: &'a TocSnapshot,
    new: &'a TocSnapshot,
    options: &DefaultDeltaOptions,
) -> ModelObjectDelta<'a> {
    compute_delta(Some(old as &dyn ModelObject), Some(new as &dyn ModelObject), options)
        .expect("delta computes")
}

fn by_object() -> DefaultDeltaOptions {
    DefaultDeltaOptions::new().with_default_method(ComputationMethod::ByObject)
}

fn child<'d, 'a>(delta: &'d ModelObjectDelta<'a>, label: &str) -> &'d ModelObjectDelta<'a> {
    delta
        .children()
        .iter()
        .find(|c| c.label() == label)
        .unwrap_or_else(|| panic!("no child delta '{label}' in\n{delta}"))
}

// ============================================================================
// Table of contents releases
// ============================================================================

mod releases {
    use super::*;

    #[test]
    fn test_identical_releases_give_empty_delta() {
        let old = snapshot("release_2024.xml");
        let new = snapshot("release_2024.xml");
        let delta = diff(&old, &new, &by_object());
        assert!(delta.is_empty());
        assert!(!delta.has_changes());
        assert!(delta.children().is_empty());
    }

    #[test]
    fn test_release_changes() {
        let old = snapshot("release_2024.xml");
        let new = snapshot("release_2025.xml");
        let delta = diff(&old, &new, &by_object());

        assert!(delta.is_changed());
        assert!(delta.is_property_changed("productDataVersion"));
        assert!(delta.is_structure_changed());
        assert!(delta.is_child_changed());

        let removed = child(&delta, "ProductComponent motor.2023");
        assert!(removed.is_removed());
        assert_eq!(removed.association(), Some(ENTRIES_ASSOCIATION));

        let added = child(&delta, "TableContents discounts");
        assert!(added.is_added());

        let home = child(&delta, "ProductComponent home.2024");
        assert!(home.is_changed());
        assert_eq!(home.changed_properties(), ["resource"]);

        let motor = child(&delta, "ProductComponent motor.2024");
        assert!(motor.is_structure_changed());
        assert!(motor.changed_properties().is_empty());
        let generation = child(motor, "Generation 2025-01-01T00:00:00Z");
        assert!(generation.is_added());
        assert_eq!(generation.association(), Some(GENERATIONS_ASSOCIATION));

        let counts = delta.counts();
        assert_eq!((counts.added, counts.removed, counts.changed), (2, 1, 3));
    }

    #[test]
    fn test_children_follow_original_order_then_additions() {
        let old = snapshot("release_2024.xml");
        let new = snapshot("release_2025.xml");
        let delta = diff(&old, &new, &by_object());
        let labels: Vec<String> = delta.children().iter().map(ModelObjectDelta::label).collect();
        assert_eq!(
            labels,
            [
                "ProductComponent motor.2024",
                "ProductComponent motor.2023",
                "ProductComponent home.2024",
                "TableContents discounts"
            ]
        );
    }

    #[test]
    fn test_ignored_property() {
        let old = snapshot("release_2024.xml");
        let new = snapshot("release_2025.xml");
        let options = by_object().ignoring("ProductComponent", "resource");
        let delta = diff(&old, &new, &options);
        assert!(delta
            .children()
            .iter()
            .all(|c| c.label() != "ProductComponent home.2024"));
    }

    #[test]
    fn test_ignore_associations_compares_root_only() {
        let old = snapshot("release_2024.xml");
        let new = snapshot("release_2025.xml");
        let options = by_object().with_ignore_associations(true);
        let delta = diff(&old, &new, &options);
        assert!(delta.is_changed());
        assert!(delta.children().is_empty());
        assert_eq!(delta.kind_of_change(), KindOfChange::PROPERTY_CHANGED);
    }

    #[test]
    fn test_subtree_delta_for_removed_product() {
        let old = snapshot("release_2024.xml");
        let new = snapshot("release_2025.xml");
        let options = by_object().with_subtree_deltas(true);
        let delta = diff(&old, &new, &options);

        let removed = child(&delta, "ProductComponent motor.2023");
        assert_eq!(removed.children().len(), 1);
        assert!(removed.children()[0].is_removed());
        assert_eq!(removed.children()[0].association(), Some(GENERATIONS_ASSOCIATION));
    }

    #[test]
    fn test_labels_in_pre_order() {
        let old = snapshot("release_2024.xml");
        let new = snapshot("release_2025.xml");
        let delta = diff(&old, &new, &by_object());

        let mut collector = LabelCollector::default();
        delta.accept(&mut collector);
        assert_eq!(collector.labels[0], "ProductDataToc");
        assert_eq!(collector.labels.len(), delta.node_count());
    }
}

// ============================================================================
// Engine contract with a hand-written model
// ============================================================================

mod contract {
    use super::*;

    #[derive(Debug)]
    struct Clause {
        kind: &'static str,
        id: &'static str,
        text: &'static str,
    }

    #[derive(Debug)]
    struct Contract {
        number: &'static str,
        premium: u32,
        clauses: Vec<Clause>,
    }

    impl ModelObject for Clause {
        fn type_name(&self) -> &str {
            self.kind
        }

        fn object_id(&self) -> Option<String> {
            Some(self.id.to_string())
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
            if let Some(other) = reference.as_any().downcast_ref::<Clause>() {
                delta.check_property_change("text", &self.text, &other.text, ctx.options());
            }
            Ok(delta)
        }
    }

    impl ModelObject for Contract {
        fn type_name(&self) -> &str {
            "Contract"
        }

        fn object_id(&self) -> Option<String> {
            Some(self.number.to_string())
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
            let Some(other) = reference.as_any().downcast_ref::<Contract>() else {
                return Ok(delta);
            };
            delta.check_property_change("premium", &self.premium, &other.premium, ctx.options());
            ctx.compute_child_deltas(
                &mut delta,
                "clauses",
                AssociationKind::Composition,
                &as_model_objects(&self.clauses),
                &as_model_objects(&other.clauses),
            )?;
            Ok(delta)
        }

        fn child_associations(&self) -> Vec<ChildAssociation<'_>> {
            vec![ChildAssociation::new(
                "clauses",
                AssociationKind::Composition,
                as_model_objects(&self.clauses),
            )]
        }
    }

    fn clause(kind: &'static str, id: &'static str, text: &'static str) -> Clause {
        Clause { kind, id, text }
    }

    fn contract(premium: u32, clauses: Vec<Clause>) -> Contract {
        Contract {
            number: "C-1",
            premium,
            clauses,
        }
    }

    #[test]
    fn test_both_absent_is_rejected() {
        let err = compute_delta(None, None, &DefaultDeltaOptions::new()).expect_err("no anchor");
        assert!(matches!(err, TocError::Delta(DeltaErrorKind::NoAnchorObject)));
    }

    #[test]
    fn test_reordering_by_position_vs_by_object() {
        let old = contract(100, vec![clause("Clause", "a", "x"), clause("Clause", "b", "y")]);
        let new = contract(100, vec![clause("Clause", "b", "y"), clause("Clause", "a", "x")]);

        let by_position = DefaultDeltaOptions::new();
        let delta = compute_delta(Some(&old as &dyn ModelObject), Some(&new as &dyn ModelObject), &by_position)
            .expect("delta");
        assert!(delta.has_changes());
        assert_eq!(delta.counts().added, 2);
        assert_eq!(delta.counts().removed, 2);

        let by_identity = DefaultDeltaOptions::new().with_association_method("clauses", ComputationMethod::ByObject);
        let delta = compute_delta(Some(&old as &dyn ModelObject), Some(&new as &dyn ModelObject), &by_identity)
            .expect("delta");
        assert!(delta.is_empty());
    }

    #[test]
    fn test_class_change_is_terminal() {
        let old = contract(100, vec![clause("Clause", "a", "x")]);
        let new = contract(100, vec![clause("Exclusion", "a", "changed")]);
        let options = DefaultDeltaOptions::new();
        let delta = compute_delta(Some(&old as &dyn ModelObject), Some(&new as &dyn ModelObject), &options)
            .expect("delta");

        // Different types never pair up, so the position holds a remove and an add
        assert_eq!(delta.children().len(), 2);

        let a = clause("Clause", "a", "x");
        let b = clause("Exclusion", "a", "changed");
        let mut class_changed = ModelObjectDelta::new_empty(&a, &b);
        assert!(class_changed.is_class_changed());
        class_changed.mark_property_changed("text");
        assert!(!class_changed.is_property_changed("text"));
        assert_eq!(class_changed.kind_of_change(), KindOfChange::CLASS_CHANGED);
    }

    #[test]
    fn test_property_and_child_changes_combine() {
        let old = contract(100, vec![clause("Clause", "a", "x")]);
        let new = contract(120, vec![clause("Clause", "a", "z")]);
        let options = DefaultDeltaOptions::new();
        let delta = compute_delta(Some(&old as &dyn ModelObject), Some(&new as &dyn ModelObject), &options)
            .expect("delta");

        assert_eq!(delta.kind(), DeltaKind::Changed);
        assert!(delta.is_property_changed("premium"));
        assert!(delta.is_child_changed());
        assert!(!delta.is_structure_changed());
        assert_eq!(delta.children()[0].changed_properties(), ["text"]);
        assert_eq!(
            delta.to_string(),
            "~ Contract C-1 [premium]\n  ~ Clause a (clauses) [text]\n"
        );
    }

    #[test]
    fn test_added_root_with_subtree() {
        let new = contract(100, vec![clause("Clause", "a", "x"), clause("Clause", "b", "y")]);
        let options = DefaultDeltaOptions::new().with_subtree_deltas(true);
        let delta = compute_delta(None, Some(&new as &dyn ModelObject), &options).expect("delta");
        assert!(delta.is_added());
        assert_eq!(delta.children().len(), 2);
        assert!(delta.children().iter().all(ModelObjectDelta::is_added));
        assert_eq!(delta.node_count(), 3);
    }

    #[test]
    fn test_visitor_can_prune() {
        struct TopLevel(usize);

        impl DeltaVisitor for TopLevel {
            fn visit(&mut self, delta: &ModelObjectDelta<'_>) -> bool {
                self.0 += 1;
                delta.association().is_none()
            }
        }

        let old = contract(100, vec![clause("Clause", "a", "x")]);
        let new = contract(120, vec![clause("Clause", "a", "z")]);
        let options = DefaultDeltaOptions::new();
        let delta = compute_delta(Some(&old as &dyn ModelObject), Some(&new as &dyn ModelObject), &options)
            .expect("delta");

        let mut visitor = TopLevel(0);
        delta.accept(&mut visitor);
        assert_eq!(visitor.0, 2);
    }
}

// ============================================================================
// Nested children without identity
// ============================================================================

mod nested {
    use super::*;

    /// Sole field, so the coverage lives at the policy's own address.
    struct Policy {
        coverage: Coverage,
    }

    struct Coverage {
        amount: u32,
    }

    impl ModelObject for Coverage {
        fn type_name(&self) -> &str {
            "Coverage"
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
            if let Some(other) = reference.as_any().downcast_ref::<Coverage>() {
                delta.check_property_change("amount", &self.amount, &other.amount, ctx.options());
            }
            Ok(delta)
        }
    }

    impl ModelObject for Policy {
        fn type_name(&self) -> &str {
            "Policy"
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
            let Some(other) = reference.as_any().downcast_ref::<Policy>() else {
                return Ok(delta);
            };
            ctx.compute_single_child_delta(
                &mut delta,
                "coverage",
                AssociationKind::Composition,
                Some(&self.coverage as &dyn ModelObject),
                Some(&other.coverage as &dyn ModelObject),
            )?;
            Ok(delta)
        }

        fn child_associations(&self) -> Vec<ChildAssociation<'_>> {
            vec![ChildAssociation::new(
                "coverage",
                AssociationKind::Composition,
                vec![&self.coverage as &dyn ModelObject],
            )]
        }
    }

    #[test]
    fn test_child_at_parent_address_is_not_a_cycle() {
        let old = Policy {
            coverage: Coverage { amount: 100 },
        };
        let new = Policy {
            coverage: Coverage { amount: 250 },
        };
        let delta = compute_delta(
            Some(&old as &dyn ModelObject),
            Some(&new as &dyn ModelObject),
            &DefaultDeltaOptions::new(),
        )
        .expect("acyclic graph compares");

        assert!(delta.is_child_changed());
        assert_eq!(delta.children().len(), 1);
        assert_eq!(delta.children()[0].changed_properties(), ["amount"]);
    }

    #[test]
    fn test_subtree_of_added_parent_includes_child_at_same_address() {
        let new = Policy {
            coverage: Coverage { amount: 100 },
        };
        let options = DefaultDeltaOptions::new().with_subtree_deltas(true);
        let delta = compute_delta(None, Some(&new as &dyn ModelObject), &options).expect("subtree delta");

        assert!(delta.is_added());
        assert_eq!(delta.children().len(), 1);
        assert!(delta.children()[0].is_added());
    }
}
