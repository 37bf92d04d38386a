//! Error types for the diff crate.

use rtm_types::EntityKey;

/// Errors that can occur during redline operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The two snapshots belong to different entities.
    #[error("cannot compare {old} with {new}: snapshots belong to different entities")]
    InvalidComparison { old: EntityKey, new: EntityKey },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
