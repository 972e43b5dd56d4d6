//! Opaque references to event handlers carried by nodes and outputs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Click,
    LongClick,
    Touch { x: f32, y: f32 },
    Visible,
    Focused,
    FullImpression,
    Invisible,
}

type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

/// Shared handle to a callback. Two handlers compare equal only if they
/// were created by the same call to [`EventHandler::new`].
#[derive(Clone)]
pub struct EventHandler {
    id: u64,
    callback: Callback,
}

impl EventHandler {
    pub fn new(callback: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed),
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn dispatch(&self, event: &Event) {
        (self.callback)(event);
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler").field(&self.id).finish()
    }
}

/// Handlers invoked as an output moves in and out of the visible rect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibilityHandlers {
    pub visible: Option<EventHandler>,
    pub focused: Option<EventHandler>,
    pub full_impression: Option<EventHandler>,
    pub invisible: Option<EventHandler>,
}

impl VisibilityHandlers {
    pub fn is_empty(&self) -> bool {
        self.visible.is_none()
            && self.focused.is_none()
            && self.full_impression.is_none()
            && self.invisible.is_none()
    }
}
