//! Redline engine for the RTM core.
//!
//! Compares two versions of a requirement or test case field by field and
//! reports which fields were added, removed, or modified, in a fixed schema
//! order. Modified text fields can be broken down further into word-level
//! segments.
//!
//! # Key Types
//!
//! - [`RedlineEngine`] / [`RedlineResult`] / [`FieldChange`] -- Field-level diff
//! - [`InlineRedline`] / [`InlineSegment`] -- Word-level diff within one field

pub mod error;
pub mod inline;
pub mod redline;

pub use error::{DiffError, DiffResult};
pub use inline::{inline_redline, InlineRedline, InlineSegment};
pub use redline::{compare_fields, redline, ChangeType, FieldChange, RedlineEngine, RedlineResult};
