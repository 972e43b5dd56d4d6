//! One layout pass: build the node tree, match it against the previous diff
//! tree, solve geometry and collect outputs.

use std::sync::Arc;

use mosaic_core::{Component, LayoutError, Rect, Size, SizeSpec, StateScope};

use crate::builder::TreeBuilder;
use crate::collect::Collector;
use crate::diff::{mark_reusable, DiffTree};
use crate::node::{Measurement, NodeKey, NodeTree};
use crate::result::LayoutResult;
use crate::solver::{LayoutSolver, MeasureDelegate};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Record a diff tree so the next pass can reuse ids and measurements.
    pub generate_diff_tree: bool,
    /// Let unchanged measurable leaves skip `measure` when their previous
    /// specs are compatible.
    pub use_cached_measurements: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            generate_diff_tree: true,
            use_cached_measurements: true,
        }
    }
}

pub struct LayoutRequest<'a> {
    pub root: &'a Component,
    pub width_spec: SizeSpec,
    pub height_spec: SizeSpec,
    pub previous_diff: Option<&'a DiffTree>,
    pub state: StateScope,
    pub config: LayoutConfig,
}

impl<'a> LayoutRequest<'a> {
    pub fn new(root: &'a Component, width_spec: SizeSpec, height_spec: SizeSpec) -> Self {
        Self {
            root,
            width_spec,
            height_spec,
            previous_diff: None,
            state: StateScope::empty(),
            config: LayoutConfig::default(),
        }
    }

    pub fn with_previous_diff(mut self, previous: Option<&'a DiffTree>) -> Self {
        self.previous_diff = previous;
        self
    }

    pub fn with_state(mut self, state: StateScope) -> Self {
        self.state = state;
        self
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }
}

/// Runs a full pass. A failed pass produces nothing.
pub fn calculate_layout(
    solver: Arc<dyn LayoutSolver>,
    request: LayoutRequest<'_>,
) -> Result<LayoutResult, LayoutError> {
    let LayoutRequest {
        root,
        width_spec,
        height_spec,
        previous_diff,
        mut state,
        config,
    } = request;

    let mut tree = NodeTree::new();
    let root_key = TreeBuilder::new(&mut tree, &mut state).build_root(root)?;
    if let Some(previous) = previous_diff {
        if let Some(diff_root) = previous.root() {
            mark_reusable(&mut tree, root_key, previous, diff_root, true);
        }
    }

    let mut cx = PassContext {
        tree,
        state,
        solver,
        previous: previous_diff,
        config,
        root: root_key,
        error: None,
    };
    let size = cx.solve_subtree(root_key, width_spec, height_spec)?;
    let PassContext { tree, state, .. } = cx;

    let collected =
        Collector::new(&tree, previous_diff, config.generate_diff_tree).collect(root_key)?;
    log::trace!(
        "layout pass for {} produced {} outputs from {} nodes",
        root.name(),
        collected.outputs.len(),
        tree.len()
    );
    Ok(LayoutResult::new(
        root.id(),
        width_spec,
        height_spec,
        size,
        collected.outputs,
        collected.visibility_outputs,
        collected.diff_tree,
        state,
    ))
}

struct PassContext<'a> {
    tree: NodeTree,
    state: StateScope,
    solver: Arc<dyn LayoutSolver>,
    previous: Option<&'a DiffTree>,
    config: LayoutConfig,
    root: NodeKey,
    /// First error raised from inside a solver callback.
    error: Option<LayoutError>,
}

impl PassContext<'_> {
    /// Solves the tree at `root`, stores the geometry and settles every
    /// holder at its final size. Returns the size of `root`.
    fn solve_subtree(
        &mut self,
        root: NodeKey,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<Size, LayoutError> {
        let solver = Arc::clone(&self.solver);
        let geometry = solver.solve(root, width, height, self)?;
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let mut holders: Vec<(NodeKey, Rect)> = Vec::new();
        for (key, rect) in geometry.iter() {
            let node = self.tree.node_mut(key)?;
            node.geometry = *rect;
            if node.is_nested_holder() {
                holders.push((key, *rect));
            }
        }
        let root_node = self.tree.node_mut(root)?;
        root_node.geometry.x = 0.0;
        root_node.geometry.y = 0.0;
        let size = root_node.geometry.size();

        for (key, rect) in holders {
            let exact_width = SizeSpec::exactly(rect.width);
            let exact_height = SizeSpec::exactly(rect.height);
            let settled = self
                .tree
                .node(key)?
                .nested
                .as_ref()
                .is_some_and(|nested| {
                    nested.root.is_some()
                        && nested
                            .measurement
                            .is_some_and(|m| m.is_reusable_for(exact_width, exact_height))
                });
            if !settled {
                self.resolve_nested(key, exact_width, exact_height)?;
            }
        }
        Ok(size)
    }

    /// Renders and solves the content of a holder under the given specs,
    /// replacing any nested tree it had.
    fn resolve_nested(
        &mut self,
        holder_key: NodeKey,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<Size, LayoutError> {
        let holder = self
            .tree
            .node(holder_key)?
            .nested
            .clone()
            .ok_or_else(|| LayoutError::MalformedTree("node is not a holder".into()))?;
        if let (Some(_), Some(measurement)) = (holder.root, holder.measurement) {
            if measurement.is_reusable_for(width, height) {
                return Ok(measurement.size);
            }
        }
        if let Some(stale) = holder.root {
            self.tree.remove_subtree(stale);
        }

        let nested_root =
            TreeBuilder::new(&mut self.tree, &mut self.state).build_nested(&holder, width, height)?;
        if holder_key == self.root {
            if let Some(previous) = self.previous {
                if let Some(diff_root) = previous.root() {
                    mark_reusable(&mut self.tree, nested_root, previous, diff_root, true);
                }
            }
        }

        // Record the root first so a failure below still leaves the subtree
        // reachable for removal.
        if let Some(nested) = self.tree.node_mut(holder_key)?.nested.as_mut() {
            nested.root = Some(nested_root);
            nested.measurement = None;
        }
        let size = self.solve_subtree(nested_root, width, height)?;
        if let Some(nested) = self.tree.node_mut(holder_key)?.nested.as_mut() {
            nested.measurement = Some(Measurement {
                width_spec: width,
                height_spec: height,
                size,
            });
        }
        Ok(size)
    }

    fn measure_leaf(
        &mut self,
        key: NodeKey,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<Size, LayoutError> {
        let node = self.tree.node(key)?;
        let reusable = if self.config.use_cached_measurements && node.cached_measure_valid {
            node.cached_measurement
                .filter(|cached| cached.is_reusable_for(width, height))
        } else {
            None
        };
        let size = match reusable {
            Some(cached) => cached.size,
            None => {
                let component = node.tail().cloned().ok_or_else(|| {
                    LayoutError::MalformedTree("measurable node without a component".into())
                })?;
                component.spec().measure(width, height)
            }
        };
        self.tree.node_mut(key)?.measurement = Some(Measurement {
            width_spec: width,
            height_spec: height,
            size,
        });
        Ok(size)
    }
}

impl MeasureDelegate for PassContext<'_> {
    fn tree(&self) -> &NodeTree {
        &self.tree
    }

    fn measure(&mut self, node: NodeKey, width: SizeSpec, height: SizeSpec) -> Size {
        let measured = match self.tree.get(node) {
            Some(layout_node) if layout_node.is_nested_holder() => {
                self.resolve_nested(node, width, height)
            }
            Some(_) => self.measure_leaf(node, width, height),
            None => Err(LayoutError::MalformedTree(format!(
                "solver measured unknown node {node:?}"
            ))),
        };
        measured.unwrap_or_else(|err| {
            self.error.get_or_insert(err);
            Size::ZERO
        })
    }
}
