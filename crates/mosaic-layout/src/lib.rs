#![doc = r"Layout passes for Mosaic: node trees, diff matching, stable output ids and result collection."]

mod builder;
mod collect;
pub mod diff;
pub mod node;
pub mod output;
pub mod output_id;
pub mod pass;
pub mod result;
pub mod solver;
pub mod taffy_solver;

pub use diff::{host_is_compatible, mark_reusable, DiffKey, DiffNode, DiffOutput, DiffTree};
pub use node::{LayoutNode, Measurement, NestedHolder, NodeKey, NodeTree};
pub use output::{LayoutOutput, MountFlags, OutputKind, UpdateState, VisibilityOutput};
pub use output_id::{OutputId, OutputIdCalculator, MAX_LEVEL, MAX_SEQUENCE, MAX_TYPE_ID};
pub use pass::{calculate_layout, LayoutConfig, LayoutRequest};
pub use result::LayoutResult;
pub use solver::{LayoutSolver, MeasureDelegate, SolvedGeometry};
pub use taffy_solver::TaffySolver;

#[cfg(test)]
#[path = "tests/output_id_tests.rs"]
mod output_id_tests;

#[cfg(test)]
#[path = "tests/taffy_solver_tests.rs"]
mod taffy_solver_tests;
