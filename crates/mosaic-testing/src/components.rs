//! Components with predictable behaviour for scenario tests.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mosaic_core::{
    props_changed, Component, ComponentSpec, Element, Interstage, MountKind, Rect,
    RenderContext, Size, SizeSpec, StateValue,
};

/// A drawable leaf with a fixed intrinsic height. It needs rebinding only
/// when its value changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub value: u32,
    pub height: f32,
}

impl Leaf {
    pub fn component(value: u32, height: f32) -> Component {
        Component::new(Leaf { value, height })
    }
}

impl ComponentSpec for Leaf {
    fn mount_kind(&self) -> MountKind {
        MountKind::Drawable
    }

    fn can_measure(&self) -> bool {
        true
    }

    fn measure(&self, width: SizeSpec, height: SizeSpec) -> Size {
        Size::new(width.resolve(0.0), height.resolve(self.height))
    }

    fn should_update(&self, previous: &dyn ComponentSpec) -> bool {
        props_changed(self, previous)
    }
}

/// A leaf mounted as its own view that paints a sub-window itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    pub height: f32,
}

impl Canvas {
    pub fn component(height: f32) -> Component {
        Component::new(Canvas { height })
    }
}

impl ComponentSpec for Canvas {
    fn mount_kind(&self) -> MountKind {
        MountKind::View
    }

    fn can_measure(&self) -> bool {
        true
    }

    fn measure(&self, width: SizeSpec, height: SizeSpec) -> Size {
        Size::new(width.resolve(0.0), height.resolve(self.height))
    }

    fn should_update(&self, previous: &dyn ComponentSpec) -> bool {
        props_changed(self, previous)
    }

    fn supports_incremental_mount(&self) -> bool {
        true
    }
}

/// Decoration used as a background or foreground.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    pub color: u32,
}

impl Paint {
    pub fn component(color: u32) -> Component {
        Component::new(Paint { color })
    }
}

impl ComponentSpec for Paint {
    fn mount_kind(&self) -> MountKind {
        MountKind::Drawable
    }

    fn should_update(&self, previous: &dyn ComponentSpec) -> bool {
        props_changed(self, previous)
    }
}

/// Call counters shared between a [`SpyLeaf`] and the test observing it.
#[derive(Clone, Debug, Default)]
pub struct SpyCounters {
    measure: Arc<AtomicUsize>,
    bounds_defined: Arc<AtomicUsize>,
    transfers: Arc<AtomicUsize>,
}

impl SpyCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure_calls(&self) -> usize {
        self.measure.load(Ordering::SeqCst)
    }

    pub fn bounds_defined_calls(&self) -> usize {
        self.bounds_defined.load(Ordering::SeqCst)
    }

    pub fn transfer_calls(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.measure.store(0, Ordering::SeqCst);
        self.bounds_defined.store(0, Ordering::SeqCst);
        self.transfers.store(0, Ordering::SeqCst);
    }
}

/// A measurable leaf that counts how often the expensive paths run. Its
/// interstage is the bounds it was last given.
#[derive(Clone)]
pub struct SpyLeaf {
    pub value: u32,
    pub height: f32,
    pub counters: SpyCounters,
}

impl SpyLeaf {
    pub fn component(value: u32, height: f32, counters: &SpyCounters) -> Component {
        Component::new(SpyLeaf {
            value,
            height,
            counters: counters.clone(),
        })
    }
}

impl fmt::Debug for SpyLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpyLeaf")
            .field("value", &self.value)
            .field("height", &self.height)
            .finish()
    }
}

impl ComponentSpec for SpyLeaf {
    fn mount_kind(&self) -> MountKind {
        MountKind::Drawable
    }

    fn can_measure(&self) -> bool {
        true
    }

    fn measure(&self, width: SizeSpec, height: SizeSpec) -> Size {
        self.counters.measure.fetch_add(1, Ordering::SeqCst);
        Size::new(width.resolve(0.0), height.resolve(self.height))
    }

    fn should_update(&self, previous: &dyn ComponentSpec) -> bool {
        previous
            .as_any()
            .downcast_ref::<SpyLeaf>()
            .map_or(true, |previous| previous.value != self.value || previous.height != self.height)
    }

    fn on_bounds_defined(&self, bounds: Rect) -> Option<Interstage> {
        self.counters.bounds_defined.fetch_add(1, Ordering::SeqCst);
        Some(Arc::new(bounds))
    }

    fn transfer_state(&self, previous: &Interstage) -> Option<Interstage> {
        self.counters.transfers.fetch_add(1, Ordering::SeqCst);
        Some(Arc::clone(previous))
    }
}

/// A column of child components inside a tagged host.
#[derive(Clone, Debug)]
pub struct Stack {
    pub children: Vec<Component>,
    pub tag: Option<&'static str>,
}

impl Stack {
    pub fn component(children: Vec<Component>) -> Component {
        Component::new(Stack {
            children,
            tag: None,
        })
    }

    /// A stack whose node gets its own host.
    pub fn hosted(tag: &'static str, children: Vec<Component>) -> Component {
        Component::new(Stack {
            children,
            tag: Some(tag),
        })
    }
}

impl ComponentSpec for Stack {
    fn render(&self, _cx: &mut RenderContext<'_>) -> Option<Element> {
        let column = Element::column().children(self.children.iter().cloned());
        Some(match self.tag {
            Some(tag) => column.view_tag(tag),
            None => column,
        })
    }
}

type Build = Arc<dyn Fn() -> Element + Send + Sync>;

/// Root component rendering whatever its closure builds.
#[derive(Clone)]
pub struct Screen {
    build: Build,
}

impl Screen {
    pub fn component(build: impl Fn() -> Element + Send + Sync + 'static) -> Component {
        Component::new(Screen {
            build: Arc::new(build),
        })
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Screen")
    }
}

impl ComponentSpec for Screen {
    fn render(&self, _cx: &mut RenderContext<'_>) -> Option<Element> {
        Some((self.build)())
    }
}

/// Renders one row per item, choosing the row height from its width. It
/// only knows what to render once its size specs are known.
#[derive(Clone, Debug)]
pub struct Feed {
    pub items: u32,
    pub renders: Arc<AtomicUsize>,
    /// Rows are [`SpyLeaf`]s reporting here when set.
    pub spies: Option<SpyCounters>,
}

impl Feed {
    pub fn component(items: u32, renders: &Arc<AtomicUsize>) -> Component {
        Component::new(Feed {
            items,
            renders: Arc::clone(renders),
            spies: None,
        })
    }

    pub fn spied(items: u32, renders: &Arc<AtomicUsize>, counters: &SpyCounters) -> Component {
        Component::new(Feed {
            items,
            renders: Arc::clone(renders),
            spies: Some(counters.clone()),
        })
    }
}

impl ComponentSpec for Feed {
    fn resolves_with_size_spec(&self) -> bool {
        true
    }

    fn render_with_size_spec(
        &self,
        _cx: &mut RenderContext<'_>,
        width: SizeSpec,
        _height: SizeSpec,
    ) -> Option<Element> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let row_height = if width.size >= 200.0 { 20.0 } else { 40.0 };
        let row = |value: u32| match &self.spies {
            Some(counters) => SpyLeaf::component(value, row_height, counters),
            None => Leaf::component(value, row_height),
        };
        Some(Element::column().children((0..self.items).map(row)))
    }
}

/// Counter kept in component state. Renders one leaf showing the count.
#[derive(Clone, Debug, PartialEq)]
pub struct Counter {
    pub start: u32,
}

impl Counter {
    pub fn component(start: u32) -> Component {
        Component::new(Counter { start })
    }
}

impl ComponentSpec for Counter {
    fn create_initial_state(&self) -> Option<StateValue> {
        Some(Arc::new(self.start))
    }

    fn render(&self, cx: &mut RenderContext<'_>) -> Option<Element> {
        let count = cx.state::<u32>().copied().unwrap_or(self.start);
        Some(Element::column().child(Leaf::component(count, 10.0)))
    }

    fn should_update(&self, previous: &dyn ComponentSpec) -> bool {
        props_changed(self, previous)
    }
}
