//! Shorthands for running passes in tests.

use std::sync::Arc;

use mosaic_core::{Component, LayoutError, SizeSpec};
use mosaic_layout::{
    calculate_layout, LayoutOutput, LayoutRequest, LayoutResult, OutputKind,
};

use crate::solver::StackSolver;

pub const SCREEN_WIDTH: f32 = 100.0;

/// Lays `root` out at [`SCREEN_WIDTH`] with an unspecified height.
pub fn lay_out(root: &Component) -> Result<Arc<LayoutResult>, LayoutError> {
    lay_out_after(root, None)
}

/// Lays `root` out against the diff tree of `previous`.
pub fn lay_out_after(
    root: &Component,
    previous: Option<&LayoutResult>,
) -> Result<Arc<LayoutResult>, LayoutError> {
    let request = LayoutRequest::new(
        root,
        SizeSpec::exactly(SCREEN_WIDTH),
        SizeSpec::unspecified(),
    )
    .with_previous_diff(previous.and_then(LayoutResult::diff_tree));
    calculate_layout(Arc::new(StackSolver::new()), request).map(Arc::new)
}

pub fn outputs_of_kind(result: &LayoutResult, kind: OutputKind) -> Vec<&LayoutOutput> {
    result
        .outputs()
        .iter()
        .filter(|output| output.kind == kind)
        .collect()
}
