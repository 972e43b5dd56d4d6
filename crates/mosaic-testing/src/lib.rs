//! Testing utilities and fixtures for Mosaic

pub mod components;
pub mod fixtures;
pub mod provider;
pub mod solver;

pub use components::*;
pub use fixtures::*;
pub use provider::*;
pub use solver::*;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::fixtures::*;
    pub use crate::provider::*;
    pub use crate::solver::*;
}
