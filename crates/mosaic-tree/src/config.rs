//! Per-tree switches.

use mosaic_layout::LayoutConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Mount only outputs intersecting the visible rect.
    pub incremental_mount: bool,
    /// Keep a diff tree per result so the next pass can match against it.
    pub generate_diff_tree: bool,
    /// Reuse measurements of unchanged leaves.
    pub use_cached_measurements: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            incremental_mount: true,
            generate_diff_tree: true,
            use_cached_measurements: true,
        }
    }
}

impl TreeConfig {
    pub fn with_incremental_mount(mut self, enabled: bool) -> Self {
        self.incremental_mount = enabled;
        self
    }

    pub fn with_diff_tree(mut self, enabled: bool) -> Self {
        self.generate_diff_tree = enabled;
        self
    }

    pub fn with_cached_measurements(mut self, enabled: bool) -> Self {
        self.use_cached_measurements = enabled;
        self
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            generate_diff_tree: self.generate_diff_tree,
            // Cached measurements come from the diff tree.
            use_cached_measurements: self.generate_diff_tree && self.use_cached_measurements,
        }
    }
}
