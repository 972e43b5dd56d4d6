//! Immutable component descriptions and the per-type capability trait.
//!
//! A [`Component`] is a cheap, cloneable value that pairs a shared
//! [`ComponentSpec`] (the props plus the behaviour of its lifecycle type)
//! with an instance id and the keys used to locate it inside a tree.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::collections::Map;
use crate::element::Element;
use crate::geometry::{Rect, Size};
use crate::size_spec::SizeSpec;
use crate::state::StateValue;

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_component_id() -> ComponentId {
    ComponentId(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Process-wide unique instance id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Small integer identifying a lifecycle type. Zero is reserved for
/// "no component".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LifecycleTypeId(u32);

impl LifecycleTypeId {
    pub const NONE: LifecycleTypeId = LifecycleTypeId(0);

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_type_id(TypeId::of::<T>())
    }

    fn from_type_id(type_id: TypeId) -> Self {
        static REGISTRY: OnceLock<Mutex<Map<TypeId, u32>>> = OnceLock::new();
        let registry = REGISTRY.get_or_init(|| Mutex::new(Map::default()));
        let mut ids = registry.lock();
        let next = ids.len() as u32 + 1;
        LifecycleTypeId(*ids.entry(type_id).or_insert(next))
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// How a component's content reaches the live surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MountKind {
    /// Pure layout; contributes no content output of its own.
    None,
    /// Lightweight paintable content that lives inside a host.
    Drawable,
    /// Content backed by its own live surface element.
    View,
}

/// Key of the pool a piece of mount content is acquired from and released to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentType {
    Host,
    Border,
    Component(LifecycleTypeId, MountKind),
}

/// Gives trait objects access to their concrete type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Derived, non-prop data computed for a component once its bounds are
/// known and carried across passes while the component stays unchanged.
pub type Interstage = Arc<dyn Any + Send + Sync>;

/// Behaviour of one lifecycle type. The implementing value doubles as the
/// component's props.
pub trait ComponentSpec: AsAny + fmt::Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Produces the element this component lays out as. Returning `None`
    /// makes the component a leaf.
    fn render(&self, _cx: &mut RenderContext<'_>) -> Option<Element> {
        None
    }

    /// Whether this component must know its size constraints before it can
    /// render. Such components become nested-tree holders.
    fn resolves_with_size_spec(&self) -> bool {
        false
    }

    fn render_with_size_spec(
        &self,
        cx: &mut RenderContext<'_>,
        _width: SizeSpec,
        _height: SizeSpec,
    ) -> Option<Element> {
        self.render(cx)
    }

    fn mount_kind(&self) -> MountKind {
        MountKind::None
    }

    /// Whether the solver must call [`ComponentSpec::measure`] for this leaf.
    fn can_measure(&self) -> bool {
        false
    }

    fn measure(&self, width: SizeSpec, height: SizeSpec) -> Size {
        Size::new(width.resolve(0.0), height.resolve(0.0))
    }

    /// Returns true when moving from `previous` to `self` requires the
    /// mounted content to be rebound.
    fn should_update(&self, _previous: &dyn ComponentSpec) -> bool {
        true
    }

    fn on_bounds_defined(&self, _bounds: Rect) -> Option<Interstage> {
        None
    }

    fn create_initial_state(&self) -> Option<StateValue> {
        None
    }

    /// Carries interstage data over from the previous pass's instance.
    fn transfer_state(&self, previous: &Interstage) -> Option<Interstage> {
        Some(Arc::clone(previous))
    }

    /// Whether mounted content of this type paints a sub-window itself and
    /// wants the visible rect forwarded to it.
    fn supports_incremental_mount(&self) -> bool {
        false
    }
}

/// `should_update` helper for specs whose props are plain comparable data.
pub fn props_changed<T: PartialEq + 'static>(next: &T, previous: &dyn ComponentSpec) -> bool {
    previous
        .as_any()
        .downcast_ref::<T>()
        .map_or(true, |previous| previous != next)
}

/// Context handed to [`ComponentSpec::render`].
pub struct RenderContext<'a> {
    global_key: &'a str,
    state: Option<&'a StateValue>,
}

impl<'a> RenderContext<'a> {
    pub fn new(global_key: &'a str, state: Option<&'a StateValue>) -> Self {
        Self { global_key, state }
    }

    pub fn global_key(&self) -> &str {
        self.global_key
    }

    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.and_then(|state| state.downcast_ref::<T>())
    }
}

#[derive(Clone)]
pub struct Component {
    id: ComponentId,
    type_id: LifecycleTypeId,
    key: Option<Arc<str>>,
    global_key: Option<Arc<str>>,
    spec: Arc<dyn ComponentSpec>,
}

impl Component {
    pub fn new<S: ComponentSpec>(spec: S) -> Self {
        Self {
            id: next_component_id(),
            type_id: LifecycleTypeId::of::<S>(),
            key: None,
            global_key: None,
            spec: Arc::new(spec),
        }
    }

    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn type_id(&self) -> LifecycleTypeId {
        self.type_id
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn global_key(&self) -> Option<&str> {
        self.global_key.as_deref()
    }

    pub fn spec(&self) -> &dyn ComponentSpec {
        &*self.spec
    }

    pub fn name(&self) -> &'static str {
        self.spec.name()
    }

    pub fn downcast<T: ComponentSpec>(&self) -> Option<&T> {
        self.spec().as_any().downcast_ref::<T>()
    }

    pub fn is_same_lifecycle(&self, other: &Component) -> bool {
        self.type_id == other.type_id
    }

    pub fn should_update(&self, previous: &Component) -> bool {
        self.spec.should_update(previous.spec())
    }

    pub fn mount_kind(&self) -> MountKind {
        self.spec.mount_kind()
    }

    pub fn content_type(&self) -> ContentType {
        ContentType::Component(self.type_id, self.spec.mount_kind())
    }

    /// Copy sharing props and instance id.
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    /// Copy sharing props but carrying a freshly minted instance id, so that
    /// anything keyed to the old id no longer matches.
    pub fn shallow_copy_with_new_id(&self) -> Self {
        let mut copy = self.clone();
        copy.id = next_component_id();
        copy
    }

    /// Copy placed at `global_key` inside a tree.
    pub fn with_global_key(&self, global_key: impl Into<Arc<str>>) -> Self {
        let mut copy = self.clone();
        copy.global_key = Some(global_key.into());
        copy
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("id", &self.id.0)
            .field("type_id", &self.type_id.0)
            .field("global_key", &self.global_key)
            .finish()
    }
}
