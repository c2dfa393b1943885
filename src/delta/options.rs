//! Comparison policy for the delta engine.

use super::object::ModelObject;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

/// How the children of a to-many association are paired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ComputationMethod {
    /// Compare the i-th original child with the i-th reference child
    #[default]
    ByPosition,
    /// Pair children that [`DeltaComputationOptions::is_same`] accepts,
    /// regardless of position
    ByObject,
}

impl std::fmt::Display for ComputationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByPosition => write!(f, "by-position"),
            Self::ByObject => write!(f, "by-object"),
        }
    }
}

/// Policy supplied per comparison call.
///
/// Only [`method`](Self::method) has no default; the remaining hooks
/// default to plain equality, object identity and "ignore nothing".
pub trait DeltaComputationOptions {
    /// Pairing strategy for the named association.
    fn method(&self, association: &str) -> ComputationMethod;

    /// Whether two children denote the same logical entity: the same type
    /// and the same object id. Two objects without ids count as the same.
    fn is_same(&self, original: &dyn ModelObject, reference: &dyn ModelObject) -> bool {
        original.type_name() == reference.type_name() && original.object_id() == reference.object_id()
    }

    /// Whether a property or association of a type is left out of the
    /// comparison.
    fn ignore(&self, _type_name: &str, _property: &str) -> bool {
        false
    }

    /// Equality override for property values. `None` falls back to `==`.
    fn are_values_equal(
        &self,
        _type_name: &str,
        _property: &str,
        _old: &dyn Any,
        _new: &dyn Any,
    ) -> Option<bool> {
        None
    }

    /// Skip child associations altogether; only the objects' own properties
    /// are compared.
    fn ignore_associations(&self) -> bool {
        false
    }

    /// Expand added and removed objects into deltas for their whole subtree.
    fn create_subtree_delta(&self) -> bool {
        false
    }
}

/// Options driven by plain data, as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultDeltaOptions {
    default_method: ComputationMethod,
    association_methods: BTreeMap<String, ComputationMethod>,
    /// `Type.property` pairs
    ignored: BTreeSet<String>,
    ignore_associations: bool,
    create_subtree_delta: bool,
}

impl DefaultDeltaOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_default_method(mut self, method: ComputationMethod) -> Self {
        self.default_method = method;
        self
    }

    #[must_use]
    pub fn with_association_method(mut self, association: impl Into<String>, method: ComputationMethod) -> Self {
        self.association_methods.insert(association.into(), method);
        self
    }

    /// Ignore `property` of `type_name`.
    #[must_use]
    pub fn ignoring(mut self, type_name: &str, property: &str) -> Self {
        self.ignored.insert(format!("{type_name}.{property}"));
        self
    }

    /// Ignore a property given in `Type.property` form.
    #[must_use]
    pub fn ignoring_qualified(mut self, qualified: impl Into<String>) -> Self {
        self.ignored.insert(qualified.into());
        self
    }

    #[must_use]
    pub const fn with_ignore_associations(mut self, ignore: bool) -> Self {
        self.ignore_associations = ignore;
        self
    }

    #[must_use]
    pub const fn with_subtree_deltas(mut self, create: bool) -> Self {
        self.create_subtree_delta = create;
        self
    }
}

impl DeltaComputationOptions for DefaultDeltaOptions {
    fn method(&self, association: &str) -> ComputationMethod {
        self.association_methods
            .get(association)
            .copied()
            .unwrap_or(self.default_method)
    }

    fn ignore(&self, type_name: &str, property: &str) -> bool {
        !self.ignored.is_empty() && self.ignored.contains(&format!("{type_name}.{property}"))
    }

    fn ignore_associations(&self) -> bool {
        self.ignore_associations
    }

    fn create_subtree_delta(&self) -> bool {
        self.create_subtree_delta
    }
}

impl From<&crate::config::DeltaConfig> for DefaultDeltaOptions {
    fn from(config: &crate::config::DeltaConfig) -> Self {
        let mut options = Self::new()
            .with_default_method(config.default_method)
            .with_ignore_associations(config.ignore_associations)
            .with_subtree_deltas(config.create_subtree_delta);
        for (association, method) in &config.association_methods {
            options = options.with_association_method(association.clone(), *method);
        }
        for qualified in &config.ignored_properties {
            options = options.ignoring_qualified(qualified.clone());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_lookup_falls_back_to_default() {
        let options = DefaultDeltaOptions::new()
            .with_default_method(ComputationMethod::ByObject)
            .with_association_method("coverages", ComputationMethod::ByPosition);

        assert_eq!(options.method("coverages"), ComputationMethod::ByPosition);
        assert_eq!(options.method("anything"), ComputationMethod::ByObject);
        assert_eq!(DefaultDeltaOptions::new().method("x"), ComputationMethod::ByPosition);
    }

    #[test]
    fn test_ignore_rules() {
        let options = DefaultDeltaOptions::new()
            .ignoring("Policy", "premium")
            .ignoring_qualified("Coverage.sumInsured");

        assert!(options.ignore("Policy", "premium"));
        assert!(options.ignore("Coverage", "sumInsured"));
        assert!(!options.ignore("Coverage", "premium"));
    }

    #[test]
    fn test_method_serde_names() {
        let yaml = serde_yaml::to_string(&ComputationMethod::ByObject).expect("serialize");
        assert_eq!(yaml.trim(), "by-object");
        let parsed: ComputationMethod = serde_yaml::from_str("by-position").expect("parse");
        assert_eq!(parsed, ComputationMethod::ByPosition);
    }
}
