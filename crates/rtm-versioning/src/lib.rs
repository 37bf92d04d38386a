//! Versioning service for the RTM redline core.
//!
//! This crate ties the version store and the redline engine together. It
//! provides:
//! - `VersioningService`: records a snapshot per edit and answers redline
//!   queries between any two versions
//! - Retry of version-number races detected by the store
//! - History validation (gapless sequence, single entity, ordered timestamps)
//! - `VersioningConfig` loaded from TOML

pub mod config;
pub mod error;
pub mod service;
pub mod validation;

pub use config::VersioningConfig;
pub use error::{VersioningError, VersioningResult};
pub use service::VersioningService;
pub use validation::{HistoryReport, HistoryValidator, Violation, ViolationKind};

// Re-export key types
pub use rtm_diff::{ChangeType, FieldChange, RedlineEngine, RedlineResult};
pub use rtm_store::{FileVersionStore, InMemoryVersionStore, StoreError, SyncMode, VersionStore};
pub use rtm_types::{
    EntityFields, EntityId, EntityKey, EntityKind, RequirementFields, RequirementStatus,
    RequirementType, TestCaseFields, UserId, VersionNumber, VersionedSnapshot,
};
