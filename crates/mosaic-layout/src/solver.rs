//! Contract between the layout pass and the box-model solver.

use mosaic_core::{LayoutError, Rect, Size, SizeSpec};
use slotmap::SecondaryMap;

use crate::node::{NodeKey, NodeTree};

/// Resolved geometry per node, relative to the parent node.
pub type SolvedGeometry = SecondaryMap<NodeKey, Rect>;

/// Callbacks the solver uses to read the tree and size leaves it cannot
/// size itself.
pub trait MeasureDelegate {
    fn tree(&self) -> &NodeTree;

    /// Sizes a measurable leaf or a nested-tree holder under the given specs.
    fn measure(&mut self, node: NodeKey, width: SizeSpec, height: SizeSpec) -> Size;
}

/// A box-model engine.
///
/// Implementations resolve the subtree rooted at `root`, treating nested
/// holders as leaves, and call [`MeasureDelegate::measure`] for every node
/// that is a holder or reports [`crate::LayoutNode::is_measurable`].
pub trait LayoutSolver: Send + Sync {
    fn solve(
        &self,
        root: NodeKey,
        width: SizeSpec,
        height: SizeSpec,
        delegate: &mut dyn MeasureDelegate,
    ) -> Result<SolvedGeometry, LayoutError>;
}
