//! Pre-order traversal of delta trees with per-node pruning.

use super::node::ModelObjectDelta;

/// Receives delta nodes during [`ModelObjectDelta::accept`].
pub trait DeltaVisitor {
    /// Visit one node. Returning `false` skips the node's children; its
    /// siblings are still visited.
    fn visit(&mut self, delta: &ModelObjectDelta<'_>) -> bool;
}

/// Adapter turning a closure into a [`DeltaVisitor`].
pub struct FnVisitor<F>(pub F);

impl<F> DeltaVisitor for FnVisitor<F>
where
    F: FnMut(&ModelObjectDelta<'_>) -> bool,
{
    fn visit(&mut self, delta: &ModelObjectDelta<'_>) -> bool {
        (self.0)(delta)
    }
}

impl ModelObjectDelta<'_> {
    /// Depth-first pre-order traversal.
    pub fn accept(&self, visitor: &mut dyn DeltaVisitor) {
        let mut stack = vec![self];
        while let Some(delta) = stack.pop() {
            if visitor.visit(delta) {
                stack.extend(delta.children().iter().rev());
            }
        }
    }

    /// [`accept`](Self::accept) with a closure.
    pub fn accept_fn<F>(&self, visit: F)
    where
        F: FnMut(&ModelObjectDelta<'_>) -> bool,
    {
        self.accept(&mut FnVisitor(visit));
    }

    /// Whether this delta or any descendant reports a change. Stops at the
    /// first changed node.
    pub fn has_changes(&self) -> bool {
        let mut found = false;
        self.accept_fn(|delta| {
            if !delta.is_empty() {
                found = true;
            }
            !found
        });
        found
    }
}

/// Collects visited nodes' labels; handy for asserting traversal order.
#[derive(Debug, Default)]
pub struct LabelCollector {
    pub labels: Vec<String>,
}

impl DeltaVisitor for LabelCollector {
    fn visit(&mut self, delta: &ModelObjectDelta<'_>) -> bool {
        self.labels.push(delta.label());
        true
    }
}
