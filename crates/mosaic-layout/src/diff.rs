//! Shadow tree retained from the previous pass and the matching that decides
//! which nodes of the new tree can reuse what it recorded.
//!
//! A [`DiffTree`] mirrors the node tree it was collected from: one
//! [`DiffNode`] per structural position, holding the components that lived
//! there, the last measurement and the ids of the outputs emitted for it.
//! Nested trees are spliced in: a holder's position records the diff node of
//! the nested root.

use std::sync::Arc;

use mosaic_core::{Border, Component, Interstage, NodeInfo};
use slotmap::SlotMap;

use crate::node::{LayoutNode, Measurement, NodeKey, NodeTree};
use crate::output_id::OutputId;

slotmap::new_key_type! {
    pub struct DiffKey;
}

/// What one output looked like last pass.
#[derive(Clone, Debug)]
pub struct DiffOutput {
    pub id: OutputId,
    pub component: Option<Component>,
}

#[derive(Clone, Debug, Default)]
pub struct DiffNode {
    pub components: Vec<Component>,
    pub measurement: Option<Measurement>,
    pub interstage: Option<Interstage>,
    pub host: Option<OutputId>,
    pub host_info: Option<Arc<NodeInfo>>,
    pub background: Option<DiffOutput>,
    pub content: Option<DiffOutput>,
    pub foreground: Option<DiffOutput>,
    pub border: Option<(OutputId, Border)>,
    pub visibility: Option<OutputId>,
    pub children: Vec<DiffKey>,
}

impl DiffNode {
    pub fn tail(&self) -> Option<&Component> {
        self.components.last()
    }
}

#[derive(Debug, Default)]
pub struct DiffTree {
    nodes: SlotMap<DiffKey, DiffNode>,
    root: Option<DiffKey>,
    root_host: Option<OutputId>,
}

impl DiffTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: DiffNode) -> DiffKey {
        self.nodes.insert(node)
    }

    pub fn get(&self, key: DiffKey) -> Option<&DiffNode> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: DiffKey) -> Option<&mut DiffNode> {
        self.nodes.get_mut(key)
    }

    pub fn root(&self) -> Option<DiffKey> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<DiffKey>) {
        self.root = root;
    }

    pub fn root_host(&self) -> Option<OutputId> {
        self.root_host
    }

    pub fn set_root_host(&mut self, id: OutputId) {
        self.root_host = Some(id);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn child(&self, parent: DiffKey, index: usize) -> Option<DiffKey> {
        self.nodes
            .get(parent)
            .and_then(|node| node.children.get(index).copied())
    }
}

/// Both nodes mount nothing of their own, or both resolved from the same
/// lifecycle type.
pub fn host_is_compatible(node: &LayoutNode, diff: &DiffNode) -> bool {
    match (node.tail(), diff.tail()) {
        (None, None) => true,
        (Some(next), Some(previous)) => next.is_same_lifecycle(previous),
        _ => false,
    }
}

fn components_unchanged(next: &[Component], previous: &[Component]) -> bool {
    next.len() == previous.len()
        && next
            .iter()
            .zip(previous)
            .all(|(next, previous)| next.is_same_lifecycle(previous) && !next.should_update(previous))
}

/// Lockstep walk over the new tree at `key` and the previous diff tree at
/// `diff_key`. Returns true when the subtree requires an update.
///
/// Nodes found unchanged get `cached_measure_valid` set, inherit the previous
/// measurement and receive the previous interstage through
/// [`mosaic_core::ComponentSpec::transfer_state`]. `is_tree_root` is true for
/// the root of the main tree and of every nested tree.
pub fn mark_reusable(
    tree: &mut NodeTree,
    key: NodeKey,
    previous: &DiffTree,
    diff_key: DiffKey,
    is_tree_root: bool,
) -> bool {
    let (Some(node), Some(diff)) = (tree.get(key), previous.get(diff_key)) else {
        return true;
    };

    // Holders re-render whenever their specs change, so their subtree is
    // matched once it exists. Below the top level that is never trusted.
    if node.is_nested_holder() {
        return true;
    }
    if !is_tree_root
        && node
            .tail()
            .is_some_and(|component| component.spec().resolves_with_size_spec())
    {
        return true;
    }
    if !host_is_compatible(node, diff) {
        return true;
    }

    let children = node.children.clone();
    let mut requires_update = children.len() != diff.children.len();
    for (child, diff_child) in children.iter().zip(diff.children.iter()) {
        if mark_reusable(tree, *child, previous, *diff_child, false) {
            requires_update = true;
        }
    }

    let Some(node) = tree.get_mut(key) else {
        return true;
    };
    if requires_update
        || node.state_updated
        || !components_unchanged(&node.components, &diff.components)
    {
        return true;
    }

    node.cached_measure_valid = true;
    node.cached_measurement = diff.measurement;
    let interstage = match (node.tail(), diff.interstage.as_ref()) {
        (Some(tail), Some(interstage)) => tail.spec().transfer_state(interstage),
        _ => None,
    };
    node.interstage = interstage;
    false
}
