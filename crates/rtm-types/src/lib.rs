//! Foundation types for the RTM redline core.
//!
//! This crate provides the identity, version, and field-state types shared by
//! the store, diff, and versioning crates. Every other RTM crate depends on
//! `rtm-types`.
//!
//! # Key Types
//!
//! - [`EntityKey`] -- Kind plus row id of a requirement or test case
//! - [`VersionNumber`] -- 1-based, gapless position in an entity's version log
//! - [`EntityFields`] -- Full field state of a requirement or test case
//! - [`CanonicalField`] -- A field reduced to its canonical string form
//! - [`VersionedSnapshot`] -- Immutable field state at one version

pub mod error;
pub mod fields;
pub mod identity;
pub mod schema;
pub mod snapshot;
pub mod version;

pub use error::TypeError;
pub use fields::{EntityFields, RequirementFields, RequirementStatus, RequirementType, TestCaseFields};
pub use identity::{EntityId, EntityKey, EntityKind, UserId};
pub use schema::{canonical_text, CanonicalField, FieldSchema, REQUIREMENT_FIELDS, TEST_CASE_FIELDS};
pub use snapshot::VersionedSnapshot;
pub use version::VersionNumber;
