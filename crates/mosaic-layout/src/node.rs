//! Per-pass layout node arena.
//!
//! Nodes are created from component descriptions at the start of a pass and
//! dropped with the [`NodeTree`] once the result has been collected. Keys are
//! generational, so a key kept past the removal of its node never aliases a
//! newer one.

use mosaic_core::{
    Border, Component, Element, Interstage, LayoutError, LifecycleTypeId, NodeInfo, Rect, Size,
    SizeSpec, Style, VisibilityHandlers,
};
use slotmap::SlotMap;

slotmap::new_key_type! {
    pub struct NodeKey;
}

/// A size produced by a measurement together with the specs it was taken
/// under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub width_spec: SizeSpec,
    pub height_spec: SizeSpec,
    pub size: Size,
}

impl Measurement {
    /// Whether measuring again under the given specs would yield `size`.
    pub fn is_reusable_for(&self, width: SizeSpec, height: SizeSpec) -> bool {
        mosaic_core::are_compatible(
            self.width_spec,
            width,
            self.size.width,
            self.height_spec,
            height,
            self.size.height,
        )
    }
}

/// State of a node whose content is rendered only once its size specs are
/// known. The nested tree lives in the same arena as the holder.
#[derive(Clone, Debug)]
pub struct NestedHolder {
    pub component: Component,
    /// Common props set on the reference to the holder component. They are
    /// applied to the nested root once it is rendered.
    pub props: Option<Element>,
    pub root: Option<NodeKey>,
    pub measurement: Option<Measurement>,
    /// Depth of the holder node, which its nested root inherits.
    pub depth: u32,
}

#[derive(Clone, Debug)]
pub struct LayoutNode {
    /// Components that resolved into this node, outermost first.
    pub components: Vec<Component>,
    pub style: Style,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub background: Option<Component>,
    pub foreground: Option<Component>,
    pub border: Option<Border>,
    pub info: NodeInfo,
    pub visibility: VisibilityHandlers,
    pub duplicate_parent_state: bool,
    pub nested: Option<NestedHolder>,
    /// Resolved geometry relative to the parent node.
    pub geometry: Rect,
    pub measurement: Option<Measurement>,
    /// Measurement carried over from the previous pass when diffing found
    /// this node unchanged.
    pub cached_measurement: Option<Measurement>,
    pub cached_measure_valid: bool,
    pub state_updated: bool,
    pub interstage: Option<Interstage>,
}

impl LayoutNode {
    pub fn new(style: Style) -> Self {
        Self {
            components: Vec::new(),
            style,
            parent: None,
            children: Vec::new(),
            background: None,
            foreground: None,
            border: None,
            info: NodeInfo::default(),
            visibility: VisibilityHandlers::default(),
            duplicate_parent_state: false,
            nested: None,
            geometry: Rect::default(),
            measurement: None,
            cached_measurement: None,
            cached_measure_valid: false,
            state_updated: false,
            interstage: None,
        }
    }

    /// The innermost component, which decides what this node mounts.
    pub fn tail(&self) -> Option<&Component> {
        self.components.last()
    }

    pub fn tail_type_id(&self) -> LifecycleTypeId {
        self.tail()
            .map_or(LifecycleTypeId::NONE, Component::type_id)
    }

    pub fn is_nested_holder(&self) -> bool {
        self.nested.is_some()
    }

    /// Leaves whose size comes from [`mosaic_core::ComponentSpec::measure`].
    pub fn is_measurable(&self) -> bool {
        self.children.is_empty()
            && self
                .tail()
                .is_some_and(|component| component.spec().can_measure())
    }

    /// Copies the common props of an element into this node.
    pub fn apply_props(&mut self, element: &Element) {
        self.style.merge_from(&element.style);
        if element.background.is_some() {
            self.background = element.background.clone();
        }
        if element.foreground.is_some() {
            self.foreground = element.foreground.clone();
        }
        if element.border.is_some() {
            self.border = element.border;
        }
        self.info.merge_from(&element.info);
        if !element.visibility.is_empty() {
            self.visibility = element.visibility.clone();
        }
        self.duplicate_parent_state |= element.duplicate_parent_state;
    }
}

#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeKey, LayoutNode>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: LayoutNode) -> NodeKey {
        self.nodes.insert(node)
    }

    pub fn get(&self, key: NodeKey) -> Option<&LayoutNode> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut LayoutNode> {
        self.nodes.get_mut(key)
    }

    pub fn node(&self, key: NodeKey) -> Result<&LayoutNode, LayoutError> {
        self.nodes
            .get(key)
            .ok_or_else(|| LayoutError::MalformedTree(format!("unknown node {key:?}")))
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Result<&mut LayoutNode, LayoutError> {
        self.nodes
            .get_mut(key)
            .ok_or_else(|| LayoutError::MalformedTree(format!("unknown node {key:?}")))
    }

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), LayoutError> {
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Removes `key` and everything below it, nested trees included.
    pub fn remove_subtree(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
                if let Some(root) = node.nested.and_then(|nested| nested.root) {
                    stack.push(root);
                }
            }
        }
    }

    /// Pre-order walk of the subtree at `root`, stepping into nested trees.
    pub fn descendants(&self, root: NodeKey) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            order.push(current);
            if let Some(nested_root) = node.nested.as_ref().and_then(|nested| nested.root) {
                stack.push(nested_root);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }
}
