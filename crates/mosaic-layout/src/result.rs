//! The product of one layout pass.
//!
//! Results are shared behind an `Arc`: a worker may compute one, hand it to
//! the tree coordinator and drop its own reference while the main thread
//! keeps mounting from it.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use mosaic_core::{are_compatible, ComponentId, Map, Size, SizeSpec, StateScope};

use crate::diff::DiffTree;
use crate::output::{LayoutOutput, VisibilityOutput};
use crate::output_id::OutputId;

static NEXT_RESULT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct LayoutResult {
    id: u64,
    root_id: ComponentId,
    width_spec: SizeSpec,
    height_spec: SizeSpec,
    size: Size,
    outputs: Vec<LayoutOutput>,
    visibility_outputs: Vec<VisibilityOutput>,
    index_by_id: Map<OutputId, usize>,
    tops: Vec<usize>,
    bottoms: Vec<usize>,
    diff_tree: Option<DiffTree>,
    state: StateScope,
}

impl LayoutResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        root_id: ComponentId,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
        size: Size,
        outputs: Vec<LayoutOutput>,
        visibility_outputs: Vec<VisibilityOutput>,
        diff_tree: Option<DiffTree>,
        state: StateScope,
    ) -> Self {
        let index_by_id = outputs
            .iter()
            .enumerate()
            .map(|(index, output)| (output.id, index))
            .collect();
        let (tops, bottoms) = sorted_orders(&outputs);
        Self {
            id: NEXT_RESULT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            root_id,
            width_spec,
            height_spec,
            size,
            outputs,
            visibility_outputs,
            index_by_id,
            tops,
            bottoms,
            diff_tree,
            state,
        }
    }

    /// Process-wide unique id of this result.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn root_id(&self) -> ComponentId {
        self.root_id
    }

    pub fn width_spec(&self) -> SizeSpec {
        self.width_spec
    }

    pub fn height_spec(&self) -> SizeSpec {
        self.height_spec
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn outputs(&self) -> &[LayoutOutput] {
        &self.outputs
    }

    pub fn output(&self, index: usize) -> Option<&LayoutOutput> {
        self.outputs.get(index)
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn index_of(&self, id: OutputId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn output_by_id(&self, id: OutputId) -> Option<&LayoutOutput> {
        self.index_of(id).and_then(|index| self.outputs.get(index))
    }

    pub fn visibility_outputs(&self) -> &[VisibilityOutput] {
        &self.visibility_outputs
    }

    /// Output indices ordered by top edge.
    pub fn tops(&self) -> &[usize] {
        &self.tops
    }

    /// Output indices ordered by bottom edge.
    pub fn bottoms(&self) -> &[usize] {
        &self.bottoms
    }

    pub fn diff_tree(&self) -> Option<&DiffTree> {
        self.diff_tree.as_ref()
    }

    pub fn state(&self) -> &StateScope {
        &self.state
    }

    /// Whether this result still describes `root_id` laid out under the
    /// given specs.
    pub fn is_compatible(&self, root_id: ComponentId, width: SizeSpec, height: SizeSpec) -> bool {
        self.root_id == root_id
            && are_compatible(
                self.width_spec,
                width,
                self.size.width,
                self.height_spec,
                height,
                self.size.height,
            )
    }
}

impl Drop for LayoutResult {
    fn drop(&mut self) {
        log::debug!(
            "releasing layout result {} ({} outputs, {} diff nodes)",
            self.id,
            self.outputs.len(),
            self.diff_tree.as_ref().map_or(0, DiffTree::len)
        );
    }
}

/// Equal tops keep output order so hosts come before their content.
/// Equal bottoms reverse it so content leaves the window before its host.
fn sorted_orders(outputs: &[LayoutOutput]) -> (Vec<usize>, Vec<usize>) {
    let mut tops: Vec<usize> = (0..outputs.len()).collect();
    tops.sort_by(|&a, &b| {
        outputs[a]
            .bounds
            .top()
            .total_cmp(&outputs[b].bounds.top())
            .then(a.cmp(&b))
    });
    let mut bottoms: Vec<usize> = (0..outputs.len()).collect();
    bottoms.sort_by(|&a, &b| match outputs[a]
        .bounds
        .bottom()
        .total_cmp(&outputs[b].bounds.bottom())
    {
        Ordering::Equal => b.cmp(&a),
        unequal => unequal,
    });
    (tops, bottoms)
}
