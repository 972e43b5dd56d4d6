//! Declarative node descriptions returned from [`ComponentSpec::render`].
//!
//! [`ComponentSpec::render`]: crate::component::ComponentSpec::render

use std::sync::Arc;

use crate::component::Component;
use crate::event::{EventHandler, VisibilityHandlers};
use crate::geometry::EdgeInsets;
use crate::style::{AlignItems, Dimension, FlexDirection, JustifyContent, PositionType, Style};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessibilityImportance {
    #[default]
    Auto,
    Yes,
    No,
    NoHideDescendants,
}

/// Edge widths plus a packed RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Border {
    pub widths: EdgeInsets,
    pub color: u32,
}

impl Border {
    pub fn new(width: f32, color: u32) -> Self {
        Self {
            widths: EdgeInsets::uniform(width),
            color,
        }
    }
}

/// Interaction and accessibility metadata. Any of it forces the node to be
/// wrapped in a host output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeInfo {
    pub click: Option<EventHandler>,
    pub long_click: Option<EventHandler>,
    pub touch: Option<EventHandler>,
    pub view_tag: Option<Arc<str>>,
    pub accessibility: AccessibilityImportance,
    pub focusable: Option<bool>,
}

impl NodeInfo {
    pub fn needs_host(&self) -> bool {
        self.click.is_some()
            || self.long_click.is_some()
            || self.touch.is_some()
            || self.view_tag.is_some()
            || self.accessibility != AccessibilityImportance::Auto
            || self.focusable.is_some()
    }

    pub fn merge_from(&mut self, other: &NodeInfo) {
        if other.click.is_some() {
            self.click = other.click.clone();
        }
        if other.long_click.is_some() {
            self.long_click = other.long_click.clone();
        }
        if other.touch.is_some() {
            self.touch = other.touch.clone();
        }
        if other.view_tag.is_some() {
            self.view_tag = other.view_tag.clone();
        }
        if other.accessibility != AccessibilityImportance::Auto {
            self.accessibility = other.accessibility;
        }
        if other.focusable.is_some() {
            self.focusable = other.focusable;
        }
    }
}

#[derive(Clone, Debug)]
pub enum ElementKind {
    Container(FlexDirection),
    Component(Component),
}

/// One node of a rendered description: a flex container with children, or
/// a reference to another component, plus the props common to both.
#[derive(Clone, Debug)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<Element>,
    pub style: Style,
    pub background: Option<Component>,
    pub foreground: Option<Component>,
    pub border: Option<Border>,
    pub info: NodeInfo,
    pub visibility: VisibilityHandlers,
    pub duplicate_parent_state: bool,
}

impl Element {
    fn with_kind(kind: ElementKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            style: Style::default(),
            background: None,
            foreground: None,
            border: None,
            info: NodeInfo::default(),
            visibility: VisibilityHandlers::default(),
            duplicate_parent_state: false,
        }
    }

    pub fn column() -> Self {
        let mut element = Self::with_kind(ElementKind::Container(FlexDirection::Column));
        element.style.set_direction(FlexDirection::Column);
        element
    }

    pub fn row() -> Self {
        let mut element = Self::with_kind(ElementKind::Container(FlexDirection::Row));
        element.style.set_direction(FlexDirection::Row);
        element
    }

    pub fn component(component: Component) -> Self {
        Self::with_kind(ElementKind::Component(component))
    }

    pub fn as_component(&self) -> Option<&Component> {
        match &self.kind {
            ElementKind::Component(component) => Some(component),
            ElementKind::Container(_) => None,
        }
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.style.set_width(Dimension::Points(width));
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.style.set_height(Dimension::Points(height));
        self
    }

    pub fn size(self, width: f32, height: f32) -> Self {
        self.width(width).height(height)
    }

    pub fn width_percent(mut self, percent: f32) -> Self {
        self.style.set_width(Dimension::Percent(percent));
        self
    }

    pub fn height_percent(mut self, percent: f32) -> Self {
        self.style.set_height(Dimension::Percent(percent));
        self
    }

    pub fn padding(mut self, padding: EdgeInsets) -> Self {
        self.style.set_padding(padding);
        self
    }

    pub fn margin(mut self, margin: EdgeInsets) -> Self {
        self.style.set_margin(margin);
        self
    }

    pub fn flex_grow(mut self, grow: f32) -> Self {
        self.style.set_flex_grow(grow);
        self
    }

    pub fn flex_shrink(mut self, shrink: f32) -> Self {
        self.style.set_flex_shrink(shrink);
        self
    }

    /// Takes the node out of flow and places it at `position` within its
    /// parent.
    pub fn absolute(mut self, position: EdgeInsets) -> Self {
        self.style.set_position_type(PositionType::Absolute);
        self.style.set_position(position);
        self
    }

    pub fn align_items(mut self, align: AlignItems) -> Self {
        self.style.set_align_items(align);
        self
    }

    pub fn justify_content(mut self, justify: JustifyContent) -> Self {
        self.style.set_justify_content(justify);
        self
    }

    pub fn background(mut self, background: Component) -> Self {
        self.background = Some(background);
        self
    }

    pub fn foreground(mut self, foreground: Component) -> Self {
        self.foreground = Some(foreground);
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn on_click(mut self, handler: EventHandler) -> Self {
        self.info.click = Some(handler);
        self
    }

    pub fn on_long_click(mut self, handler: EventHandler) -> Self {
        self.info.long_click = Some(handler);
        self
    }

    pub fn on_touch(mut self, handler: EventHandler) -> Self {
        self.info.touch = Some(handler);
        self
    }

    pub fn view_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.info.view_tag = Some(tag.into());
        self
    }

    pub fn accessibility(mut self, importance: AccessibilityImportance) -> Self {
        self.info.accessibility = importance;
        self
    }

    pub fn focusable(mut self, focusable: bool) -> Self {
        self.info.focusable = Some(focusable);
        self
    }

    pub fn duplicate_parent_state(mut self) -> Self {
        self.duplicate_parent_state = true;
        self
    }

    pub fn on_visible(mut self, handler: EventHandler) -> Self {
        self.visibility.visible = Some(handler);
        self
    }

    pub fn on_focused(mut self, handler: EventHandler) -> Self {
        self.visibility.focused = Some(handler);
        self
    }

    pub fn on_full_impression(mut self, handler: EventHandler) -> Self {
        self.visibility.full_impression = Some(handler);
        self
    }

    pub fn on_invisible(mut self, handler: EventHandler) -> Self {
        self.visibility.invisible = Some(handler);
        self
    }

    /// Folds the common props of `outer` (a reference to a component) into
    /// `self` (what that component rendered to). Props set on the reference
    /// win.
    pub fn merge_common_props(&mut self, outer: &Element) {
        self.style.merge_from(&outer.style);
        if outer.background.is_some() {
            self.background = outer.background.clone();
        }
        if outer.foreground.is_some() {
            self.foreground = outer.foreground.clone();
        }
        if outer.border.is_some() {
            self.border = outer.border;
        }
        self.info.merge_from(&outer.info);
        let visibility = &outer.visibility;
        if visibility.visible.is_some() {
            self.visibility.visible = visibility.visible.clone();
        }
        if visibility.focused.is_some() {
            self.visibility.focused = visibility.focused.clone();
        }
        if visibility.full_impression.is_some() {
            self.visibility.full_impression = visibility.full_impression.clone();
        }
        if visibility.invisible.is_some() {
            self.visibility.invisible = visibility.invisible.clone();
        }
        self.duplicate_parent_state |= outer.duplicate_parent_state;
    }
}

impl From<Component> for Element {
    fn from(component: Component) -> Self {
        Element::component(component)
    }
}
