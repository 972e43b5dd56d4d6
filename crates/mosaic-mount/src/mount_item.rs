use mosaic_core::{ContentType, Rect};
use mosaic_layout::{LayoutOutput, OutputId};

/// Live binding between one output id and the content mounted for it.
#[derive(Debug)]
pub struct MountItem<C> {
    pub(crate) content: C,
    pub(crate) output: LayoutOutput,
    pub(crate) index: usize,
}

impl<C> MountItem<C> {
    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn output(&self) -> &LayoutOutput {
        &self.output
    }

    pub fn id(&self) -> OutputId {
        self.output.id
    }

    pub fn content_type(&self) -> ContentType {
        self.output.content_type
    }

    pub fn host(&self) -> Option<OutputId> {
        self.output.host
    }

    pub fn bounds(&self) -> Rect {
        self.output.bounds
    }

    /// Position in the output list this item was last mounted from.
    pub fn index(&self) -> usize {
        self.index
    }
}
