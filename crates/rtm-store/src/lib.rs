//! Append-only version storage for the RTM redline core.
//!
//! Every edit of a requirement or test case is kept as an immutable
//! [`VersionedSnapshot`](rtm_types::VersionedSnapshot) keyed by
//! (entity, version number). This crate defines the store boundary the
//! versioning service talks to and the backends that implement it.
//!
//! # Storage Backends
//!
//! All backends implement the [`VersionStore`] trait:
//!
//! - [`InMemoryVersionStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileVersionStore`] -- CRC-framed append-only log file
//!
//! # Design Rules
//!
//! 1. Snapshots are immutable once appended; there are no updates or deletes.
//! 2. Versions per entity are gapless, starting at 1.
//! 3. A duplicate (entity, version) append fails; it never overwrites.
//! 4. The store keeps no version counters of its own beyond what it holds.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use file::{FileVersionStore, SyncMode};
pub use memory::InMemoryVersionStore;
pub use traits::VersionStore;
