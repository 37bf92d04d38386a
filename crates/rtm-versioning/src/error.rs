use rtm_diff::DiffError;
use rtm_store::StoreError;
use rtm_types::{EntityKey, TypeError, VersionNumber};

/// Errors produced by versioning operations.
#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    #[error("version {version} of {key} not found")]
    VersionNotFound { key: EntityKey, version: VersionNumber },

    #[error("snapshot requested for {requested} belongs to {found}")]
    EntityMismatch { requested: EntityKey, found: EntityKey },

    /// Another writer recorded this version number first.
    #[error("version {version} of {key} was recorded concurrently")]
    DuplicateVersion { key: EntityKey, version: VersionNumber },

    #[error("write conflict on {key}: version number still taken after {attempts} attempts")]
    WriteConflict { key: EntityKey, attempts: u32 },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] TypeError),

    #[error("redline error: {0}")]
    Redline(#[from] DiffError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("config error: {0}")]
    Config(String),
}

impl From<StoreError> for VersioningError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateVersion { key, version } => Self::DuplicateVersion { key, version },
            other => Self::Store(other),
        }
    }
}

pub type VersioningResult<T> = Result<T, VersioningError>;
