//! Flex style carried by layout nodes.
//!
//! Every setter records the property in [`StyleFlags`] so that a property
//! explicitly set to its default value can be told apart from one that was
//! never set. Merging only copies set properties.

use bitflags::bitflags;

use crate::geometry::EdgeInsets;

bitflags! {
    /// Marks which style properties were explicitly set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u16 {
        const DIRECTION       = 1 << 0;
        const WIDTH           = 1 << 1;
        const HEIGHT          = 1 << 2;
        const PADDING         = 1 << 3;
        const MARGIN          = 1 << 4;
        const FLEX_GROW       = 1 << 5;
        const FLEX_SHRINK     = 1 << 6;
        const POSITION_TYPE   = 1 << 7;
        const POSITION        = 1 << 8;
        const ALIGN_ITEMS     = 1 << 9;
        const JUSTIFY_CONTENT = 1 << 10;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Dimension {
    #[default]
    Auto,
    Points(f32),
    Percent(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlignItems {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JustifyContent {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    flags: StyleFlags,
    pub direction: FlexDirection,
    pub width: Dimension,
    pub height: Dimension,
    pub padding: EdgeInsets,
    pub margin: EdgeInsets,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub position_type: PositionType,
    pub position: EdgeInsets,
    pub align_items: AlignItems,
    pub justify_content: JustifyContent,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            flags: StyleFlags::empty(),
            direction: FlexDirection::Column,
            width: Dimension::Auto,
            height: Dimension::Auto,
            padding: EdgeInsets::default(),
            margin: EdgeInsets::default(),
            flex_grow: 0.0,
            flex_shrink: 1.0,
            position_type: PositionType::Relative,
            position: EdgeInsets::default(),
            align_items: AlignItems::Stretch,
            justify_content: JustifyContent::Start,
        }
    }
}

impl Style {
    pub fn flags(&self) -> StyleFlags {
        self.flags
    }

    pub fn is_set(&self, flag: StyleFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_direction(&mut self, direction: FlexDirection) {
        self.direction = direction;
        self.flags |= StyleFlags::DIRECTION;
    }

    pub fn set_width(&mut self, width: Dimension) {
        self.width = width;
        self.flags |= StyleFlags::WIDTH;
    }

    pub fn set_height(&mut self, height: Dimension) {
        self.height = height;
        self.flags |= StyleFlags::HEIGHT;
    }

    pub fn set_padding(&mut self, padding: EdgeInsets) {
        self.padding = padding;
        self.flags |= StyleFlags::PADDING;
    }

    pub fn set_margin(&mut self, margin: EdgeInsets) {
        self.margin = margin;
        self.flags |= StyleFlags::MARGIN;
    }

    pub fn set_flex_grow(&mut self, grow: f32) {
        self.flex_grow = grow;
        self.flags |= StyleFlags::FLEX_GROW;
    }

    pub fn set_flex_shrink(&mut self, shrink: f32) {
        self.flex_shrink = shrink;
        self.flags |= StyleFlags::FLEX_SHRINK;
    }

    pub fn set_position_type(&mut self, position_type: PositionType) {
        self.position_type = position_type;
        self.flags |= StyleFlags::POSITION_TYPE;
    }

    pub fn set_position(&mut self, position: EdgeInsets) {
        self.position = position;
        self.flags |= StyleFlags::POSITION;
    }

    pub fn set_align_items(&mut self, align: AlignItems) {
        self.align_items = align;
        self.flags |= StyleFlags::ALIGN_ITEMS;
    }

    pub fn set_justify_content(&mut self, justify: JustifyContent) {
        self.justify_content = justify;
        self.flags |= StyleFlags::JUSTIFY_CONTENT;
    }

    /// Copies every property set on `other` into `self`, leaving the rest
    /// untouched.
    pub fn merge_from(&mut self, other: &Style) {
        let set = other.flags;
        if set.contains(StyleFlags::DIRECTION) {
            self.direction = other.direction;
        }
        if set.contains(StyleFlags::WIDTH) {
            self.width = other.width;
        }
        if set.contains(StyleFlags::HEIGHT) {
            self.height = other.height;
        }
        if set.contains(StyleFlags::PADDING) {
            self.padding = other.padding;
        }
        if set.contains(StyleFlags::MARGIN) {
            self.margin = other.margin;
        }
        if set.contains(StyleFlags::FLEX_GROW) {
            self.flex_grow = other.flex_grow;
        }
        if set.contains(StyleFlags::FLEX_SHRINK) {
            self.flex_shrink = other.flex_shrink;
        }
        if set.contains(StyleFlags::POSITION_TYPE) {
            self.position_type = other.position_type;
        }
        if set.contains(StyleFlags::POSITION) {
            self.position = other.position;
        }
        if set.contains(StyleFlags::ALIGN_ITEMS) {
            self.align_items = other.align_items;
        }
        if set.contains(StyleFlags::JUSTIFY_CONTENT) {
            self.justify_content = other.justify_content;
        }
        self.flags |= set;
    }
}
