#![doc = r"Shared value types for the Mosaic reconciliation engine: geometry, size specs, component descriptions, state and errors."]

pub mod collections;
pub mod component;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod size_spec;
pub mod state;
pub mod style;

pub use collections::{map_with_capacity, Map, Set};
pub use component::{
    props_changed, AsAny, Component, ComponentId, ComponentSpec, ContentType, Interstage,
    LifecycleTypeId, MountKind, RenderContext,
};
pub use element::{AccessibilityImportance, Border, Element, ElementKind, NodeInfo};
pub use error::{LayoutError, MountError};
pub use event::{Event, EventHandler, VisibilityHandlers};
pub use geometry::{EdgeInsets, Point, Rect, Size};
pub use size_spec::{are_compatible, is_compatible, SizeSpec, SpecMode, SIZE_TOLERANCE};
pub use state::{StateHandle, StateScope, StateUpdate, StateValue};
pub use style::{
    AlignItems, Dimension, FlexDirection, JustifyContent, PositionType, Style, StyleFlags,
};

#[cfg(test)]
#[path = "tests/core_tests.rs"]
mod tests;
