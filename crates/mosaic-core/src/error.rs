//! Error taxonomy shared by the layout and mount layers.
//!
//! [`LayoutError`] is the fatal tier: the pass that raised it publishes
//! nothing. [`MountError`] is the tolerant tier: the reconciler records it,
//! skips the affected output and keeps going.

use thiserror::Error;

use crate::component::ContentType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("output level {level} exceeds the id encoding capacity")]
    LevelOverflow { level: u32 },
    #[error("output sequence {sequence} exceeds the id encoding capacity")]
    SequenceOverflow { sequence: u32 },
    #[error("lifecycle type id {type_id} exceeds the id encoding capacity")]
    TypeIdOverflow { type_id: u32 },
    #[error("malformed node tree: {0}")]
    MalformedTree(String),
    #[error("solver failed: {0}")]
    Solver(String),
    #[error("no root component set")]
    MissingRoot,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("could not acquire mount content of type {content_type:?} for output {id:#x}")]
    AcquireFailed { id: u64, content_type: ContentType },
    #[error("output {id:#x} references host {host:#x} which is not mounted")]
    MissingHost { id: u64, host: u64 },
}
