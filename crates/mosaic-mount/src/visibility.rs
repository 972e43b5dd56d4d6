//! Visibility event processing.
//!
//! Each visibility output is tracked across passes and viewport changes.
//! Handlers fire on transitions only: entering the visible rect, becoming
//! fully visible, becoming focused and leaving the visible rect. Without a
//! visible rect everything counts as fully visible.

use mosaic_core::{Event, EventHandler, Map, Rect, Set, VisibilityHandlers};
use mosaic_layout::{OutputId, VisibilityOutput};

#[derive(Debug)]
struct TrackedItem {
    handlers: VisibilityHandlers,
    full_impression: bool,
    focused: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilityStats {
    pub visible: usize,
    pub focused: usize,
    pub full_impression: usize,
    pub invisible: usize,
}

#[derive(Debug, Default)]
pub struct VisibilityTracker {
    items: Map<OutputId, TrackedItem>,
}

fn fire(handler: Option<&EventHandler>, event: Event, count: &mut usize) {
    if let Some(handler) = handler {
        handler.dispatch(&event);
        *count += 1;
    }
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, id: OutputId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn tracked(&self) -> usize {
        self.items.len()
    }

    pub fn process(&mut self, outputs: &[VisibilityOutput], visible: Option<Rect>) -> VisibilityStats {
        let mut stats = VisibilityStats::default();
        let mut seen = Set::default();

        for output in outputs {
            let bounds = output.bounds;
            let in_view = visible.map_or(true, |visible| visible.intersects(&bounds));
            if !in_view {
                if let Some(item) = self.items.remove(&output.id) {
                    fire(item.handlers.invisible.as_ref(), Event::Invisible, &mut stats.invisible);
                }
                continue;
            }
            seen.insert(output.id);

            let item = self.items.entry(output.id).or_insert_with(|| {
                fire(output.handlers.visible.as_ref(), Event::Visible, &mut stats.visible);
                TrackedItem {
                    handlers: output.handlers.clone(),
                    full_impression: false,
                    focused: false,
                }
            });
            item.handlers = output.handlers.clone();

            let fully_visible = visible.map_or(true, |visible| visible.contains_rect(&bounds));
            if fully_visible && !item.full_impression {
                item.full_impression = true;
                fire(
                    item.handlers.full_impression.as_ref(),
                    Event::FullImpression,
                    &mut stats.full_impression,
                );
            }

            let focused = fully_visible
                || visible
                    .and_then(|visible| {
                        visible
                            .intersection(&bounds)
                            .map(|shown| shown.height >= visible.height / 2.0)
                    })
                    .unwrap_or(false);
            if focused && !item.focused {
                fire(item.handlers.focused.as_ref(), Event::Focused, &mut stats.focused);
            }
            item.focused = focused;
        }

        let gone: Vec<OutputId> = self
            .items
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        for id in gone {
            if let Some(item) = self.items.remove(&id) {
                fire(item.handlers.invisible.as_ref(), Event::Invisible, &mut stats.invisible);
            }
        }
        stats
    }

    /// Fires exit events for everything tracked and forgets it.
    pub fn clear(&mut self) -> VisibilityStats {
        let mut stats = VisibilityStats::default();
        for (_, item) in self.items.drain() {
            fire(item.handlers.invisible.as_ref(), Event::Invisible, &mut stats.invisible);
        }
        stats
    }
}
