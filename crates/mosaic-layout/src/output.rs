//! Flattened, positioned units produced by a layout pass.

use std::sync::Arc;

use bitflags::bitflags;
use mosaic_core::{
    Border, Component, ContentType, EdgeInsets, Interstage, NodeInfo, Rect, VisibilityHandlers,
};

use crate::output_id::OutputId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Content,
    Background,
    Foreground,
    Border,
    Host,
}

impl OutputKind {
    pub(crate) fn bits(self) -> u8 {
        match self {
            OutputKind::Content => 0,
            OutputKind::Background => 1,
            OutputKind::Foreground => 2,
            OutputKind::Border => 3,
            OutputKind::Host => 4,
        }
    }

    pub(crate) fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(OutputKind::Content),
            1 => Some(OutputKind::Background),
            2 => Some(OutputKind::Foreground),
            3 => Some(OutputKind::Border),
            4 => Some(OutputKind::Host),
            _ => None,
        }
    }
}

/// How an output's content relates to what the same id mounted last pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateState {
    /// No usable previous output.
    #[default]
    Unknown,
    /// Same id and nothing changed; mounted content can be left alone.
    Updated,
    /// Same id but the content may need rebinding.
    Dirty,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MountFlags: u8 {
        /// Content mirrors the pressed/selected state of its host.
        const DUPLICATE_PARENT_STATE = 1 << 0;
        /// Content paints a sub-window itself and wants the visible rect.
        const INCREMENTAL_MOUNT      = 1 << 1;
    }
}

/// One mountable unit.
#[derive(Clone, Debug)]
pub struct LayoutOutput {
    pub id: OutputId,
    pub kind: OutputKind,
    /// Bounds in tree-local coordinates.
    pub bounds: Rect,
    /// Id of the host output this one mounts into. Only the root host has
    /// none.
    pub host: Option<OutputId>,
    pub flags: MountFlags,
    pub update_state: UpdateState,
    /// Whether the content must be rebound when its id survived from the
    /// previous pass.
    pub should_update: bool,
    pub content_type: ContentType,
    pub component: Option<Component>,
    pub border: Option<Border>,
    /// Interaction metadata; only set on host outputs.
    pub info: Option<Arc<NodeInfo>>,
    pub padding: EdgeInsets,
    pub interstage: Option<Interstage>,
}

impl LayoutOutput {
    pub fn is_host(&self) -> bool {
        self.kind == OutputKind::Host
    }

    pub fn supports_incremental_mount(&self) -> bool {
        self.flags.contains(MountFlags::INCREMENTAL_MOUNT)
    }
}

#[derive(Clone, Debug)]
pub struct VisibilityOutput {
    pub id: OutputId,
    pub bounds: Rect,
    pub handlers: VisibilityHandlers,
    pub global_key: Option<Arc<str>>,
}
