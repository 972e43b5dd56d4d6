//! Depth-first collection of a resolved node tree into the flat output list.
//!
//! The walk follows the node tree and the previous diff tree in lockstep.
//! Per node it emits, in this order: a host output if the node needs one, the
//! background, the content, the children's outputs, the foreground and the
//! border. A host switches every later output of the subtree to a new host
//! id and one level deeper. The very first output is always the root host.

use std::sync::Arc;

use mosaic_core::{
    Border, Component, ContentType, EdgeInsets, Interstage, LayoutError, LifecycleTypeId,
    MountKind, NodeInfo, Point, Rect,
};

use crate::diff::{host_is_compatible, DiffKey, DiffNode, DiffOutput, DiffTree};
use crate::node::{LayoutNode, NodeKey, NodeTree};
use crate::output::{LayoutOutput, MountFlags, OutputKind, VisibilityOutput};
use crate::output_id::{OutputId, OutputIdCalculator};

/// Host, level and origin threaded through the recursion.
#[derive(Clone, Copy)]
struct Frame {
    host: OutputId,
    level: u32,
    origin: Point,
}

pub(crate) struct Collected {
    pub outputs: Vec<LayoutOutput>,
    pub visibility_outputs: Vec<VisibilityOutput>,
    pub diff_tree: Option<DiffTree>,
}

pub(crate) struct Collector<'a> {
    tree: &'a NodeTree,
    previous: Option<&'a DiffTree>,
    ids: OutputIdCalculator,
    visibility_ids: OutputIdCalculator,
    outputs: Vec<LayoutOutput>,
    visibility_outputs: Vec<VisibilityOutput>,
    diff_tree: Option<DiffTree>,
}

impl<'a> Collector<'a> {
    pub(crate) fn new(
        tree: &'a NodeTree,
        previous: Option<&'a DiffTree>,
        generate_diff_tree: bool,
    ) -> Self {
        Self {
            tree,
            previous,
            ids: OutputIdCalculator::new(),
            visibility_ids: OutputIdCalculator::new(),
            outputs: Vec::with_capacity(tree.len() * 2),
            visibility_outputs: Vec::new(),
            diff_tree: generate_diff_tree.then(DiffTree::new),
        }
    }

    pub(crate) fn collect(mut self, root: NodeKey) -> Result<Collected, LayoutError> {
        let root_node = self.tree.node(root)?;
        let previous_root_host = self.previous.and_then(DiffTree::root_host);
        let (root_host, update_state) = self.ids.calculate(
            LifecycleTypeId::NONE,
            0,
            OutputKind::Host,
            previous_root_host,
            previous_root_host.is_some(),
        )?;
        self.outputs.push(LayoutOutput {
            id: root_host,
            kind: OutputKind::Host,
            bounds: Rect::from_origin_size(Point::ZERO, root_node.geometry.size()),
            host: None,
            flags: MountFlags::empty(),
            update_state,
            should_update: false,
            content_type: ContentType::Host,
            component: None,
            border: None,
            info: None,
            padding: EdgeInsets::default(),
            interstage: None,
        });
        if let Some(diff_tree) = self.diff_tree.as_mut() {
            diff_tree.set_root_host(root_host);
        }

        let frame = Frame {
            host: root_host,
            level: 1,
            origin: Point::ZERO,
        };
        let previous_root = self.previous.and_then(DiffTree::root);
        let new_root = self.collect_node(root, previous_root, frame)?;
        if let Some(diff_tree) = self.diff_tree.as_mut() {
            diff_tree.set_root(new_root);
        }

        Ok(Collected {
            outputs: self.outputs,
            visibility_outputs: self.visibility_outputs,
            diff_tree: self.diff_tree,
        })
    }

    fn previous_node(&self, key: Option<DiffKey>) -> Option<&'a DiffNode> {
        let previous = self.previous?;
        previous.get(key?)
    }

    fn record(&mut self, key: Option<DiffKey>) -> Option<&mut DiffNode> {
        self.diff_tree.as_mut()?.get_mut(key?)
    }

    /// Emits the outputs of the subtree at `key`. Kept lean since it runs
    /// once per tree level: outputs are built by the `push_*` helpers and
    /// the diff record lives in the diff tree rather than on the stack.
    fn collect_node(
        &mut self,
        key: NodeKey,
        diff_key: Option<DiffKey>,
        mut frame: Frame,
    ) -> Result<Option<DiffKey>, LayoutError> {
        let tree = self.tree;
        let node = tree.node(key)?;
        let bounds = node.geometry.translate(frame.origin.x, frame.origin.y);

        if let Some(nested) = &node.nested {
            let nested_root = nested.root.ok_or_else(|| {
                LayoutError::MalformedTree(format!(
                    "holder {} was never resolved",
                    nested.component.name()
                ))
            })?;
            frame.origin = bounds.origin();
            return self.collect_node(nested_root, diff_key, frame);
        }

        let diff = self.previous_node(diff_key);
        let record = self.diff_tree.as_mut().map(|diff_tree| {
            diff_tree.insert(DiffNode {
                components: node.components.clone(),
                measurement: node.measurement,
                interstage: node.interstage.clone(),
                ..DiffNode::default()
            })
        });

        if node.info.needs_host() {
            let (id, info) = self.push_host(node, bounds, diff, frame)?;
            if let Some(record) = self.record(record) {
                record.host = Some(id);
                record.host_info = Some(info);
            }
            frame.host = id;
            frame.level += 1;
        }

        if let Some(background) = &node.background {
            let previous = diff.and_then(|diff| diff.background.as_ref());
            let emitted =
                self.push_decoration(node, background, OutputKind::Background, bounds, previous, frame)?;
            if let Some(record) = self.record(record) {
                record.background = Some(emitted);
            }
        }

        if let Some(tail) = node.tail() {
            if tail.mount_kind() != MountKind::None {
                let (emitted, interstage) = self.push_content(node, tail, bounds, diff, frame)?;
                if let Some(record) = self.record(record) {
                    record.content = Some(emitted);
                    record.interstage = interstage;
                }
            }
        }

        if !node.visibility.is_empty() {
            let id = self.push_visibility(node, bounds, diff, frame)?;
            if let Some(record) = self.record(record) {
                record.visibility = Some(id);
            }
        }

        let mut child_records = Vec::with_capacity(node.children.len());
        let child_frame = Frame {
            origin: bounds.origin(),
            ..frame
        };
        for (index, child) in node.children.iter().enumerate() {
            let child_diff = diff.and_then(|diff| diff.children.get(index).copied());
            if let Some(child_record) = self.collect_node(*child, child_diff, child_frame)? {
                child_records.push(child_record);
            }
        }
        if let Some(record) = self.record(record) {
            record.children = child_records;
        }

        if let Some(foreground) = &node.foreground {
            let previous = diff.and_then(|diff| diff.foreground.as_ref());
            let emitted =
                self.push_decoration(node, foreground, OutputKind::Foreground, bounds, previous, frame)?;
            if let Some(record) = self.record(record) {
                record.foreground = Some(emitted);
            }
        }

        if let Some(border) = node.border {
            let previous = diff.and_then(|diff| diff.border);
            let id = self.push_border(node, border, bounds, previous, frame)?;
            if let Some(record) = self.record(record) {
                record.border = Some((id, border));
            }
        }

        Ok(record)
    }

    fn push_host(
        &mut self,
        node: &LayoutNode,
        bounds: Rect,
        diff: Option<&DiffNode>,
        frame: Frame,
    ) -> Result<(OutputId, Arc<NodeInfo>), LayoutError> {
        let previous = diff.and_then(|diff| diff.host);
        let cache_valid =
            previous.is_some() && diff.is_some_and(|diff| host_is_compatible(node, diff));
        let (id, update_state) = self.ids.calculate(
            node.tail_type_id(),
            frame.level,
            OutputKind::Host,
            previous,
            cache_valid,
        )?;
        let info = Arc::new(node.info.clone());
        let should_update = diff
            .and_then(|diff| diff.host_info.as_deref())
            .map_or(true, |previous| *previous != *info);
        self.outputs.push(LayoutOutput {
            id,
            kind: OutputKind::Host,
            bounds,
            host: Some(frame.host),
            flags: MountFlags::empty(),
            update_state,
            should_update,
            content_type: ContentType::Host,
            component: None,
            border: None,
            info: Some(Arc::clone(&info)),
            padding: EdgeInsets::default(),
            interstage: None,
        });
        Ok((id, info))
    }

    fn push_visibility(
        &mut self,
        node: &LayoutNode,
        bounds: Rect,
        diff: Option<&DiffNode>,
        frame: Frame,
    ) -> Result<OutputId, LayoutError> {
        let previous = diff.and_then(|diff| diff.visibility);
        let (id, _) = self.visibility_ids.calculate(
            node.tail_type_id(),
            frame.level,
            OutputKind::Content,
            previous,
            false,
        )?;
        self.visibility_outputs.push(VisibilityOutput {
            id,
            bounds,
            handlers: node.visibility.clone(),
            global_key: node
                .tail()
                .and_then(Component::global_key)
                .map(Arc::from),
        });
        Ok(id)
    }

    fn push_decoration(
        &mut self,
        node: &LayoutNode,
        component: &Component,
        kind: OutputKind,
        bounds: Rect,
        previous: Option<&DiffOutput>,
        frame: Frame,
    ) -> Result<DiffOutput, LayoutError> {
        let previous_component = previous.and_then(|previous| previous.component.as_ref());
        let should_update = previous_component.map_or(true, |previous| {
            !component.is_same_lifecycle(previous) || component.should_update(previous)
        });
        let cache_valid = previous_component.is_some() && !should_update;
        let (id, update_state) = self.ids.calculate(
            component.type_id(),
            frame.level,
            kind,
            previous.map(|previous| previous.id),
            cache_valid,
        )?;
        self.outputs.push(LayoutOutput {
            id,
            kind,
            bounds,
            host: Some(frame.host),
            flags: duplicate_parent_state(node),
            update_state,
            should_update,
            content_type: component.content_type(),
            component: Some(component.clone()),
            border: None,
            info: None,
            padding: EdgeInsets::default(),
            interstage: None,
        });
        Ok(DiffOutput {
            id,
            component: Some(component.clone()),
        })
    }

    /// Emits the node's own content. Derived state is reused from the
    /// previous pass when diffing found the node unchanged; bounds are
    /// always taken from the current geometry.
    fn push_content(
        &mut self,
        node: &LayoutNode,
        tail: &Component,
        bounds: Rect,
        diff: Option<&DiffNode>,
        frame: Frame,
    ) -> Result<(DiffOutput, Option<Interstage>), LayoutError> {
        let previous = diff.and_then(|diff| diff.content.as_ref());
        let cache_valid = node.cached_measure_valid;
        let should_update = if cache_valid {
            false
        } else {
            previous
                .and_then(|previous| previous.component.as_ref())
                .map_or(true, |previous| {
                    !tail.is_same_lifecycle(previous) || tail.should_update(previous)
                })
        };
        let interstage = if cache_valid {
            node.interstage.clone()
        } else {
            tail.spec().on_bounds_defined(bounds)
        };
        let (id, update_state) = self.ids.calculate(
            tail.type_id(),
            frame.level,
            OutputKind::Content,
            previous.map(|previous| previous.id),
            cache_valid,
        )?;

        let mut flags = duplicate_parent_state(node);
        if tail.spec().supports_incremental_mount() {
            flags |= MountFlags::INCREMENTAL_MOUNT;
        }
        self.outputs.push(LayoutOutput {
            id,
            kind: OutputKind::Content,
            bounds,
            host: Some(frame.host),
            flags,
            update_state,
            should_update,
            content_type: tail.content_type(),
            component: Some(tail.clone()),
            border: None,
            info: None,
            padding: node.style.padding,
            interstage: interstage.clone(),
        });
        Ok((
            DiffOutput {
                id,
                component: Some(tail.clone()),
            },
            interstage,
        ))
    }

    fn push_border(
        &mut self,
        node: &LayoutNode,
        border: Border,
        bounds: Rect,
        previous: Option<(OutputId, Border)>,
        frame: Frame,
    ) -> Result<OutputId, LayoutError> {
        let should_update = previous.map_or(true, |(_, previous)| previous != border);
        let (id, update_state) = self.ids.calculate(
            LifecycleTypeId::of::<Border>(),
            frame.level,
            OutputKind::Border,
            previous.map(|(id, _)| id),
            previous.is_some() && !should_update,
        )?;
        self.outputs.push(LayoutOutput {
            id,
            kind: OutputKind::Border,
            bounds,
            host: Some(frame.host),
            flags: duplicate_parent_state(node),
            update_state,
            should_update,
            content_type: ContentType::Border,
            component: None,
            border: Some(border),
            info: None,
            padding: EdgeInsets::default(),
            interstage: None,
        });
        Ok(id)
    }
}

fn duplicate_parent_state(node: &LayoutNode) -> MountFlags {
    if node.duplicate_parent_state {
        MountFlags::DUPLICATE_PARENT_STATE
    } else {
        MountFlags::empty()
    }
}
