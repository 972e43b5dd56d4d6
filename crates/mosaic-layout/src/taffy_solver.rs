//! Default [`LayoutSolver`] backed by the taffy flexbox engine.

use mosaic_core::{
    AlignItems, Dimension, EdgeInsets, FlexDirection, JustifyContent, LayoutError, PositionType,
    Rect, SizeSpec, SpecMode, Style,
};
use taffy::{AvailableSpace, LengthPercentage, LengthPercentageAuto, NodeId, TaffyError, TaffyTree};

use crate::node::{NodeKey, NodeTree};
use crate::solver::{LayoutSolver, MeasureDelegate, SolvedGeometry};

#[derive(Clone, Copy, Debug, Default)]
pub struct TaffySolver;

impl TaffySolver {
    pub fn new() -> Self {
        Self
    }
}

fn solver_error(err: TaffyError) -> LayoutError {
    LayoutError::Solver(err.to_string())
}

fn to_taffy_dimension(dimension: Dimension) -> taffy::Dimension {
    match dimension {
        Dimension::Auto => taffy::Dimension::Auto,
        Dimension::Points(points) => taffy::Dimension::Length(points),
        Dimension::Percent(percent) => taffy::Dimension::Percent(percent / 100.0),
    }
}

fn to_taffy_padding(insets: EdgeInsets) -> taffy::Rect<LengthPercentage> {
    taffy::Rect {
        left: LengthPercentage::Length(insets.left),
        right: LengthPercentage::Length(insets.right),
        top: LengthPercentage::Length(insets.top),
        bottom: LengthPercentage::Length(insets.bottom),
    }
}

fn to_taffy_margin(insets: EdgeInsets) -> taffy::Rect<LengthPercentageAuto> {
    taffy::Rect {
        left: LengthPercentageAuto::Length(insets.left),
        right: LengthPercentageAuto::Length(insets.right),
        top: LengthPercentageAuto::Length(insets.top),
        bottom: LengthPercentageAuto::Length(insets.bottom),
    }
}

fn to_taffy_style(style: &Style) -> taffy::Style {
    taffy::Style {
        display: taffy::Display::Flex,
        position: match style.position_type {
            PositionType::Relative => taffy::Position::Relative,
            PositionType::Absolute => taffy::Position::Absolute,
        },
        inset: match style.position_type {
            PositionType::Relative => taffy::Rect {
                left: LengthPercentageAuto::Auto,
                right: LengthPercentageAuto::Auto,
                top: LengthPercentageAuto::Auto,
                bottom: LengthPercentageAuto::Auto,
            },
            PositionType::Absolute => to_taffy_margin(style.position),
        },
        flex_direction: match style.direction {
            FlexDirection::Column => taffy::FlexDirection::Column,
            FlexDirection::Row => taffy::FlexDirection::Row,
        },
        size: taffy::Size {
            width: to_taffy_dimension(style.width),
            height: to_taffy_dimension(style.height),
        },
        padding: to_taffy_padding(style.padding),
        margin: to_taffy_margin(style.margin),
        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        align_items: Some(match style.align_items {
            AlignItems::Start => taffy::AlignItems::FlexStart,
            AlignItems::Center => taffy::AlignItems::Center,
            AlignItems::End => taffy::AlignItems::FlexEnd,
            AlignItems::Stretch => taffy::AlignItems::Stretch,
        }),
        justify_content: Some(match style.justify_content {
            JustifyContent::Start => taffy::JustifyContent::FlexStart,
            JustifyContent::Center => taffy::JustifyContent::Center,
            JustifyContent::End => taffy::JustifyContent::FlexEnd,
            JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
        }),
        ..Default::default()
    }
}

fn to_available_space(spec: SizeSpec) -> AvailableSpace {
    match spec.mode {
        SpecMode::Exactly | SpecMode::AtMost => AvailableSpace::Definite(spec.size),
        SpecMode::Unspecified => AvailableSpace::MaxContent,
    }
}

fn to_size_spec(known: Option<f32>, available: AvailableSpace) -> SizeSpec {
    match (known, available) {
        (Some(size), _) => SizeSpec::exactly(size),
        (None, AvailableSpace::Definite(size)) => SizeSpec::at_most(size),
        (None, AvailableSpace::MinContent | AvailableSpace::MaxContent) => SizeSpec::unspecified(),
    }
}

/// Pins the root's own size to the specs it is laid out under.
fn constrain_root(style: &mut taffy::Style, width: SizeSpec, height: SizeSpec) {
    match width.mode {
        SpecMode::Exactly => style.size.width = taffy::Dimension::Length(width.size),
        SpecMode::AtMost => style.max_size.width = taffy::Dimension::Length(width.size),
        SpecMode::Unspecified => {}
    }
    match height.mode {
        SpecMode::Exactly => style.size.height = taffy::Dimension::Length(height.size),
        SpecMode::AtMost => style.max_size.height = taffy::Dimension::Length(height.size),
        SpecMode::Unspecified => {}
    }
}

fn mirror(
    taffy: &mut TaffyTree<NodeKey>,
    tree: &NodeTree,
    key: NodeKey,
    mapping: &mut Vec<(NodeKey, NodeId)>,
) -> Result<NodeId, LayoutError> {
    let node = tree.node(key)?;
    let style = to_taffy_style(&node.style);
    let id = if node.is_nested_holder() || node.is_measurable() {
        taffy.new_leaf_with_context(style, key)
    } else if node.children.is_empty() {
        taffy.new_leaf(style)
    } else {
        let children = node
            .children
            .iter()
            .map(|child| mirror(taffy, tree, *child, mapping))
            .collect::<Result<Vec<_>, _>>()?;
        taffy.new_with_children(style, &children)
    }
    .map_err(solver_error)?;
    mapping.push((key, id));
    Ok(id)
}

impl LayoutSolver for TaffySolver {
    fn solve(
        &self,
        root: NodeKey,
        width: SizeSpec,
        height: SizeSpec,
        delegate: &mut dyn MeasureDelegate,
    ) -> Result<SolvedGeometry, LayoutError> {
        let mut taffy: TaffyTree<NodeKey> = TaffyTree::new();
        let mut mapping = Vec::new();
        let root_id = mirror(&mut taffy, delegate.tree(), root, &mut mapping)?;

        let mut root_style = taffy.style(root_id).map_err(solver_error)?.clone();
        constrain_root(&mut root_style, width, height);
        taffy.set_style(root_id, root_style).map_err(solver_error)?;

        let available = taffy::Size {
            width: to_available_space(width),
            height: to_available_space(height),
        };
        taffy
            .compute_layout_with_measure(
                root_id,
                available,
                |known: taffy::Size<Option<f32>>,
                 space: taffy::Size<AvailableSpace>,
                 _id: NodeId,
                 context: Option<&mut NodeKey>,
                 _style: &taffy::Style| {
                    let Some(key) = context else {
                        return taffy::Size {
                            width: known.width.unwrap_or(0.0),
                            height: known.height.unwrap_or(0.0),
                        };
                    };
                    let size = delegate.measure(
                        *key,
                        to_size_spec(known.width, space.width),
                        to_size_spec(known.height, space.height),
                    );
                    taffy::Size {
                        width: size.width,
                        height: size.height,
                    }
                },
            )
            .map_err(solver_error)?;

        let mut geometry = SolvedGeometry::new();
        for (key, id) in mapping {
            let layout = taffy.layout(id).map_err(solver_error)?;
            geometry.insert(
                key,
                Rect::new(
                    layout.location.x,
                    layout.location.y,
                    layout.size.width,
                    layout.size.height,
                ),
            );
        }
        Ok(geometry)
    }
}
