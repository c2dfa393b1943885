//! Text and serialisable views of a delta tree.

use super::node::{DeltaKind, KindOfChange, ModelObjectDelta};
use super::object::AssociationKind;
use serde::Serialize;
use std::fmt;

/// Owned, serialisable copy of a delta tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaSummary {
    pub kind: DeltaKind,
    pub kind_of_change: KindOfChange,
    pub object: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association_kind: Option<AssociationKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changed_properties: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DeltaSummary>,
}

/// Node counts per delta kind over a whole tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeltaCounts {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl DeltaCounts {
    pub const fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

impl ModelObjectDelta<'_> {
    pub fn summary(&self) -> DeltaSummary {
        DeltaSummary {
            kind: self.kind(),
            kind_of_change: self.kind_of_change(),
            object: self.label(),
            association: self.association().map(str::to_string),
            association_kind: self.association_kind(),
            changed_properties: self.changed_properties().into_iter().map(str::to_string).collect(),
            children: self.children().iter().map(ModelObjectDelta::summary).collect(),
        }
    }

    pub fn counts(&self) -> DeltaCounts {
        let mut counts = DeltaCounts::default();
        self.accept_fn(|delta| {
            match delta.kind() {
                DeltaKind::Added => counts.added += 1,
                DeltaKind::Removed => counts.removed += 1,
                DeltaKind::Changed => counts.changed += 1,
                DeltaKind::Empty => {}
            }
            true
        });
        counts
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let marker = match self.kind() {
            DeltaKind::Empty => '=',
            DeltaKind::Changed => '~',
            DeltaKind::Added => '+',
            DeltaKind::Removed => '-',
        };
        write!(f, "{:indent$}{marker} {}", "", self.label(), indent = depth * 2)?;
        if let Some(association) = self.association() {
            write!(f, " ({association})")?;
        }
        if self.is_class_changed() {
            if let (Some(original), Some(reference)) = (self.original(), self.reference()) {
                write!(f, " [class: {} -> {}]", original.type_name(), reference.type_name())?;
            }
        }
        let properties = self.changed_properties();
        if !properties.is_empty() {
            write!(f, " [{}]", properties.join(", "))?;
        }
        writeln!(f)?;
        for child in self.children() {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

/// One line per node, children indented under their parent:
///
/// ```text
/// ~ ProductDataToc [productDataVersion]
///   + ProductComponent motor.2024-07 (entries)
///   ~ ProductComponent motor.2024-01 (entries) [validTo]
/// ```
impl fmt::Display for ModelObjectDelta<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
