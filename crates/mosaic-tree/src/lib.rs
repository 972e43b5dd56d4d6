#![doc = r"Tree coordination for Mosaic: owns the root description and size specs, runs layout passes on any thread, keeps the best main layout and binds it to a mount surface."]

pub mod config;
pub mod executor;
pub mod surface;
pub mod tree;

pub use config::TreeConfig;
pub use executor::{InlineExecutor, LayoutExecutor, LayoutJob, ThreadExecutor};
pub use surface::ComponentSurface;
pub use tree::{ComponentTree, TreePhase};

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
