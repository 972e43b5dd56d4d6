//! Stable output identities.
//!
//! An id packs four fields into one `u64`:
//!
//! | bits    | field             |
//! |---------|-------------------|
//! | 0..16   | sequence          |
//! | 16..19  | output kind       |
//! | 19..27  | level             |
//! | 27..53  | lifecycle type id |
//!
//! Everything but the sequence forms the base signature. Outputs sharing a
//! signature within one pass are told apart by the sequence, which is taken
//! from the previous pass's id whenever that is still possible so that ids
//! survive unrelated changes elsewhere in the tree.

use std::fmt;

use mosaic_core::{LayoutError, LifecycleTypeId, Map};

use crate::output::{OutputKind, UpdateState};

const SEQUENCE_BITS: u32 = 16;
const KIND_BITS: u32 = 3;
const LEVEL_BITS: u32 = 8;
const TYPE_BITS: u32 = 26;

const KIND_SHIFT: u32 = SEQUENCE_BITS;
const LEVEL_SHIFT: u32 = KIND_SHIFT + KIND_BITS;
const TYPE_SHIFT: u32 = LEVEL_SHIFT + LEVEL_BITS;

pub const MAX_SEQUENCE: u32 = (1 << SEQUENCE_BITS) - 1;
pub const MAX_LEVEL: u32 = (1 << LEVEL_BITS) - 1;
pub const MAX_TYPE_ID: u32 = (1 << TYPE_BITS) - 1;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(u64);

impl OutputId {
    fn compose(type_id: u32, level: u32, kind: OutputKind, sequence: u32) -> Self {
        OutputId(
            (u64::from(type_id) << TYPE_SHIFT)
                | (u64::from(level) << LEVEL_SHIFT)
                | (u64::from(kind.bits()) << KIND_SHIFT)
                | u64::from(sequence),
        )
    }

    pub fn from_raw(raw: u64) -> Self {
        OutputId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn sequence(self) -> u32 {
        (self.0 & u64::from(MAX_SEQUENCE)) as u32
    }

    pub fn kind(self) -> Option<OutputKind> {
        OutputKind::from_bits(((self.0 >> KIND_SHIFT) & ((1 << KIND_BITS) - 1)) as u8)
    }

    pub fn level(self) -> u32 {
        ((self.0 >> LEVEL_SHIFT) & u64::from(MAX_LEVEL)) as u32
    }

    pub fn type_id(self) -> u32 {
        ((self.0 >> TYPE_SHIFT) & u64::from(MAX_TYPE_ID)) as u32
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OutputId({:#x}: type={} level={} kind={:?} seq={})",
            self.0,
            self.type_id(),
            self.level(),
            self.kind(),
            self.sequence()
        )
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Assigns ids for one layout result. Create a fresh calculator (or call
/// [`OutputIdCalculator::reset`]) for every pass.
#[derive(Debug, Default)]
pub struct OutputIdCalculator {
    next_sequence: Map<OutputId, u32>,
}

impl OutputIdCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.next_sequence.clear();
    }

    /// Returns the id for an output with the given signature and how its
    /// mounted content relates to the previous pass.
    ///
    /// `previous` is the id the output at this position had last pass. Its
    /// sequence is reused when its level matches and the sequence has not
    /// been handed out yet in this pass; the state is then
    /// [`UpdateState::Updated`] if `cache_valid`, else [`UpdateState::Dirty`].
    /// Otherwise the next free sequence is assigned with
    /// [`UpdateState::Unknown`].
    pub fn calculate(
        &mut self,
        type_id: LifecycleTypeId,
        level: u32,
        kind: OutputKind,
        previous: Option<OutputId>,
        cache_valid: bool,
    ) -> Result<(OutputId, UpdateState), LayoutError> {
        if level > MAX_LEVEL {
            return Err(LayoutError::LevelOverflow { level });
        }
        if type_id.raw() > MAX_TYPE_ID {
            return Err(LayoutError::TypeIdOverflow {
                type_id: type_id.raw(),
            });
        }

        let base = OutputId::compose(type_id.raw(), level, kind, 0);
        let next_free = self.next_sequence.get(&base).copied().unwrap_or(0);

        let (sequence, state) = match previous {
            Some(previous) if previous.level() == level && previous.sequence() >= next_free => {
                let state = if cache_valid {
                    UpdateState::Updated
                } else {
                    UpdateState::Dirty
                };
                (previous.sequence(), state)
            }
            _ => (next_free, UpdateState::Unknown),
        };

        if sequence > MAX_SEQUENCE {
            return Err(LayoutError::SequenceOverflow { sequence });
        }
        self.next_sequence.insert(base, sequence + 1);

        Ok((
            OutputId::compose(type_id.raw(), level, kind, sequence),
            state,
        ))
    }
}
