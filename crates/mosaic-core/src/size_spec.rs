//! Size constraints handed to the solver and the rules for reusing a
//! measurement taken under a different constraint.
//!
//! A [`SizeSpec`] pairs a [`SpecMode`] with a size. The compatibility check
//! [`is_compatible`] answers "would measuring again under `new` produce the
//! size we already measured under `old`?" without calling the solver.

use std::fmt;

/// Tolerance used when comparing an exact spec against a measured size.
pub const SIZE_TOLERANCE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecMode {
    /// The node must be exactly `size`.
    Exactly,
    /// The node may be any size up to `size`.
    AtMost,
    /// The parent imposes no constraint; `size` is ignored.
    Unspecified,
}

#[derive(Clone, Copy, PartialEq)]
pub struct SizeSpec {
    pub mode: SpecMode,
    pub size: f32,
}

impl SizeSpec {
    pub fn exactly(size: f32) -> Self {
        Self {
            mode: SpecMode::Exactly,
            size: size.max(0.0),
        }
    }

    pub fn at_most(size: f32) -> Self {
        Self {
            mode: SpecMode::AtMost,
            size: size.max(0.0),
        }
    }

    pub fn unspecified() -> Self {
        Self {
            mode: SpecMode::Unspecified,
            size: 0.0,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.mode == SpecMode::Exactly
    }

    /// Clamps a desired size into this spec.
    pub fn resolve(&self, desired: f32) -> f32 {
        match self.mode {
            SpecMode::Exactly => self.size,
            SpecMode::AtMost => desired.min(self.size).max(0.0),
            SpecMode::Unspecified => desired.max(0.0),
        }
    }

    /// Upper bound implied by this spec, if any.
    pub fn max_size(&self) -> Option<f32> {
        match self.mode {
            SpecMode::Exactly | SpecMode::AtMost => Some(self.size),
            SpecMode::Unspecified => None,
        }
    }
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self::unspecified()
    }
}

impl fmt::Debug for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            SpecMode::Exactly => write!(f, "EXACTLY {}", self.size),
            SpecMode::AtMost => write!(f, "AT_MOST {}", self.size),
            SpecMode::Unspecified => write!(f, "UNSPECIFIED"),
        }
    }
}

/// Returns true if a node measured as `old_measured` under `old` would
/// measure the same under `new`.
pub fn is_compatible(old: SizeSpec, new: SizeSpec, old_measured: f32) -> bool {
    old == new
        || (old.mode == SpecMode::Unspecified && new.mode == SpecMode::Unspecified)
        || new_size_is_exact_and_matches(new, old_measured)
        || old_unspecified_and_still_fits(old, new, old_measured)
        || new_at_most_is_stricter_and_still_valid(old, new, old_measured)
}

/// Checks both axes at once.
pub fn are_compatible(
    old_width: SizeSpec,
    new_width: SizeSpec,
    old_measured_width: f32,
    old_height: SizeSpec,
    new_height: SizeSpec,
    old_measured_height: f32,
) -> bool {
    is_compatible(old_width, new_width, old_measured_width)
        && is_compatible(old_height, new_height, old_measured_height)
}

fn new_size_is_exact_and_matches(new: SizeSpec, old_measured: f32) -> bool {
    new.mode == SpecMode::Exactly && (new.size - old_measured).abs() < SIZE_TOLERANCE
}

fn old_unspecified_and_still_fits(old: SizeSpec, new: SizeSpec, old_measured: f32) -> bool {
    old.mode == SpecMode::Unspecified && new.mode == SpecMode::AtMost && new.size >= old_measured
}

fn new_at_most_is_stricter_and_still_valid(old: SizeSpec, new: SizeSpec, old_measured: f32) -> bool {
    old.mode == SpecMode::AtMost
        && new.mode == SpecMode::AtMost
        && old.size > new.size
        && old_measured <= new.size
}
