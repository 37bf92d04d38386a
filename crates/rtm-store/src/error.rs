use rtm_types::{EntityKey, VersionNumber};

/// Errors from version store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A snapshot with this (key, version) already exists. Raised when two
    /// writers allocate the same version number concurrently.
    #[error("version {version} of {key} already exists")]
    DuplicateVersion { key: EntityKey, version: VersionNumber },

    /// The appended version does not directly follow the latest one.
    #[error("version {actual} of {key} does not follow the latest version; expected {expected}")]
    VersionGap {
        key: EntityKey,
        expected: VersionNumber,
        actual: VersionNumber,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot serve requests (poisoned lock, lost connection, timeout).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` for the write race that a caller may resolve by
    /// recomputing the version number.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateVersion { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
