//! A solver with fully predictable geometry.
//!
//! Children stack vertically from the parent's padded top-left corner. A
//! node is as wide as its explicit width or its parent's content box, and as
//! tall as its explicit height, its measured height or the sum of its
//! children. Measurable leaves and holders are always measured with an exact
//! width and an unspecified height, so measurement counts are easy to
//! predict.

use mosaic_core::{Dimension, LayoutError, Rect, Size, SizeSpec, SpecMode};
use mosaic_layout::{LayoutSolver, MeasureDelegate, NodeKey, SolvedGeometry};

#[derive(Clone, Copy, Debug, Default)]
pub struct StackSolver;

impl StackSolver {
    pub fn new() -> Self {
        Self
    }
}

fn resolve_dimension(dimension: Dimension, available: f32) -> Option<f32> {
    match dimension {
        Dimension::Auto => None,
        Dimension::Points(points) => Some(points),
        Dimension::Percent(percent) => Some(available * percent / 100.0),
    }
}

fn place(
    key: NodeKey,
    x: f32,
    y: f32,
    available_width: f32,
    delegate: &mut dyn MeasureDelegate,
    geometry: &mut SolvedGeometry,
) -> Result<Size, LayoutError> {
    let node = delegate.tree().node(key)?;
    let style = node.style;
    let children = node.children.clone();
    let measured = node.is_nested_holder() || node.is_measurable();

    let width = resolve_dimension(style.width, available_width).unwrap_or(available_width);
    let explicit_height = resolve_dimension(style.height, 0.0);

    let height = if measured {
        let height_spec = explicit_height.map_or_else(SizeSpec::unspecified, SizeSpec::exactly);
        delegate
            .measure(key, SizeSpec::exactly(width), height_spec)
            .height
    } else {
        let padding = style.padding;
        let inner_width = (width - padding.horizontal_sum()).max(0.0);
        let mut cursor = padding.top;
        for child in children {
            let size = place(child, padding.left, cursor, inner_width, delegate, geometry)?;
            cursor += size.height;
        }
        explicit_height.unwrap_or(cursor + padding.bottom)
    };

    geometry.insert(key, Rect::new(x, y, width, height));
    Ok(Size::new(width, height))
}

impl LayoutSolver for StackSolver {
    fn solve(
        &self,
        root: NodeKey,
        width: SizeSpec,
        height: SizeSpec,
        delegate: &mut dyn MeasureDelegate,
    ) -> Result<SolvedGeometry, LayoutError> {
        let mut geometry = SolvedGeometry::new();
        let available = match width.mode {
            SpecMode::Unspecified => 0.0,
            SpecMode::Exactly | SpecMode::AtMost => width.size,
        };
        let size = place(root, 0.0, 0.0, available, delegate, &mut geometry)?;
        if let Some(rect) = geometry.get_mut(root) {
            rect.width = width.resolve(size.width);
            rect.height = height.resolve(size.height);
        }
        Ok(geometry)
    }
}
