use thiserror::Error;

use crate::identity::{EntityKey, EntityKind};

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown {kind} variant: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("invalid version number {0}: versions start at 1")]
    InvalidVersion(u32),

    #[error("invalid entity key: {0:?}")]
    InvalidKey(String),

    #[error("snapshot of {key} carries {actual} fields")]
    KindMismatch { key: EntityKey, actual: EntityKind },
}
