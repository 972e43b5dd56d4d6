//! Main-thread owner of the mounted content for one tree.

use mosaic_core::Rect;
use mosaic_mount::{MountContentProvider, MountState, MountStats};

use crate::tree::ComponentTree;

pub struct ComponentSurface<P: MountContentProvider> {
    tree: ComponentTree,
    mount_state: MountState<P>,
}

impl<P: MountContentProvider> ComponentSurface<P> {
    pub fn new(tree: ComponentTree, provider: P) -> Self {
        let incremental = tree.config().incremental_mount;
        Self {
            tree,
            mount_state: MountState::new(provider).with_incremental_mount(incremental),
        }
    }

    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    pub fn mount_state(&self) -> &MountState<P> {
        &self.mount_state
    }

    pub fn mount_state_mut(&mut self) -> &mut MountState<P> {
        &mut self.mount_state
    }

    /// Mounts the tree's current main layout. Returns `None` while the tree
    /// has no layout yet.
    pub fn mount(&mut self, visible: Option<Rect>) -> Option<MountStats> {
        let main = self.tree.main_layout()?;
        Some(self.mount_state.mount(&main, visible))
    }

    pub fn unmount_all(&mut self) -> MountStats {
        self.mount_state.unmount_all()
    }
}
