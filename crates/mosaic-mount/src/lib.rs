#![doc = r"Mount reconciliation for Mosaic: applies layout results to live content through a pooled provider, with windowed incremental mount and visibility events."]

pub mod mount_item;
pub mod mount_state;
pub mod pool;
pub mod provider;
pub mod visibility;

pub use mount_item::MountItem;
pub use mount_state::{MountState, MountStats};
pub use pool::{ContentPool, PoolConfig};
pub use provider::{MountBinding, MountContentProvider};
pub use visibility::{VisibilityStats, VisibilityTracker};

#[cfg(test)]
#[path = "tests/pool_tests.rs"]
mod pool_tests;

#[cfg(test)]
#[path = "tests/visibility_tests.rs"]
mod visibility_tests;
