//! The contract between the reconciler and whatever owns live content.

use mosaic_core::{ContentType, Rect};
use mosaic_layout::{LayoutOutput, OutputId};

/// Everything a provider needs to configure content for one output.
#[derive(Clone, Copy, Debug)]
pub struct MountBinding<'a> {
    pub output: &'a LayoutOutput,
    /// Host the content is placed in. `None` only for the root host.
    pub host: Option<OutputId>,
    /// Position of the output in the output list, which is also its paint
    /// order.
    pub index: usize,
    /// Bounds relative to the host.
    pub bounds: Rect,
}

/// Creates, recycles and configures mount content.
///
/// The reconciler calls these only from the thread that owns the mount
/// state. Content handed to [`MountContentProvider::release`] is moved, so
/// it cannot be released twice.
pub trait MountContentProvider {
    type Content;

    /// Returns content for `content_type` from a pool or freshly built.
    /// `None` means the output cannot be mounted this pass.
    fn acquire(&mut self, content_type: ContentType) -> Option<Self::Content>;

    fn release(&mut self, content_type: ContentType, content: Self::Content);

    fn bind(&mut self, content: &mut Self::Content, binding: &MountBinding<'_>);

    fn unbind(&mut self, content: &mut Self::Content);

    fn set_bounds(&mut self, _content: &mut Self::Content, _bounds: Rect) {}

    /// The output moved from position `from` to `to` in its host.
    fn move_content(&mut self, _content: &mut Self::Content, _from: usize, _to: usize) {}

    /// Forwards the visible part of the content, in its own coordinates.
    fn set_visible_rect(&mut self, _content: &mut Self::Content, _visible: Rect) {}
}
