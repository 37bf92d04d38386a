//! Field-level redline: compare two snapshots of the same entity.
//!
//! Both snapshots are reduced to their canonical fields (see
//! [`rtm_types::schema`]) and compared position by position in schema order.
//! A field that is empty on one side and filled on the other is `Added` or
//! `Removed`; a field filled on both sides with different text is `Modified`;
//! equal fields produce no entry.

use rtm_types::{CanonicalField, VersionNumber, VersionedSnapshot};
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Classification of one field's difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

impl ChangeType {
    /// The classification seen when the two versions are swapped.
    pub fn inverse(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
            Self::Modified => Self::Modified,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Modified => "Modified",
        };
        f.write_str(name)
    }
}

/// One field that differs between two versions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Schema name of the field, e.g. `Status`.
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub change_type: ChangeType,
}

/// The result of comparing two versions of one entity.
///
/// `changes` holds one entry per differing field, in schema order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedlineResult {
    pub old_version: VersionNumber,
    pub new_version: VersionNumber,
    pub changes: Vec<FieldChange>,
}

impl RedlineResult {
    /// Returns `true` if the two versions hold identical field values.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of fields that gained a value.
    pub fn additions(&self) -> usize {
        self.count(ChangeType::Added)
    }

    /// Number of fields that lost their value.
    pub fn removals(&self) -> usize {
        self.count(ChangeType::Removed)
    }

    /// Number of fields whose value changed.
    pub fn modifications(&self) -> usize {
        self.count(ChangeType::Modified)
    }

    /// The change for a field, if that field differs.
    pub fn change(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }

    fn count(&self, change_type: ChangeType) -> usize {
        self.changes
            .iter()
            .filter(|c| c.change_type == change_type)
            .count()
    }
}

/// Compares snapshots field by field.
///
/// The engine holds no state; every call is a pure function of its inputs,
/// so identical inputs always produce identical results.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedlineEngine;

impl RedlineEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compare `old` against `new`.
    ///
    /// Change types are relative to the argument order: pass the earlier
    /// version first. Fails with [`DiffError::InvalidComparison`] when the
    /// snapshots belong to different entities.
    pub fn compare(
        &self,
        old: &VersionedSnapshot,
        new: &VersionedSnapshot,
    ) -> DiffResult<RedlineResult> {
        if old.key != new.key || old.fields.kind() != new.fields.kind() {
            return Err(DiffError::InvalidComparison {
                old: old.key,
                new: new.key,
            });
        }

        Ok(RedlineResult {
            old_version: old.version,
            new_version: new.version,
            changes: compare_fields(&old.canonical_fields(), &new.canonical_fields()),
        })
    }
}

/// Compare two canonical field lists of the same schema.
///
/// Fields are matched by name; the output follows the order of `old`, which
/// for lists produced by one schema is the schema order. A field missing
/// from one side is treated as empty there.
pub fn compare_fields(old: &[CanonicalField], new: &[CanonicalField]) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for old_field in old {
        let new_value = new
            .iter()
            .find(|f| f.name == old_field.name)
            .and_then(|f| f.value.as_deref());
        if let Some(change) = classify(old_field.name, old_field.value.as_deref(), new_value) {
            changes.push(change);
        }
    }

    for new_field in new {
        if !old.iter().any(|f| f.name == new_field.name) {
            if let Some(change) = classify(new_field.name, None, new_field.value.as_deref()) {
                changes.push(change);
            }
        }
    }

    changes
}

/// Classify one field; `None` when the values are equal.
fn classify(field: &str, old: Option<&str>, new: Option<&str>) -> Option<FieldChange> {
    let change_type = match (old, new) {
        (None, None) => return None,
        (None, Some(_)) => ChangeType::Added,
        (Some(_), None) => ChangeType::Removed,
        (Some(a), Some(b)) if a == b => return None,
        (Some(_), Some(_)) => ChangeType::Modified,
    };
    Some(FieldChange {
        field: field.to_string(),
        old_value: old.map(str::to_string),
        new_value: new.map(str::to_string),
        change_type,
    })
}

/// Compare two snapshots with a default engine.
pub fn redline(old: &VersionedSnapshot, new: &VersionedSnapshot) -> DiffResult<RedlineResult> {
    RedlineEngine::new().compare(old, new)
}
