//! Schema field order and canonical string forms.
//!
//! Redlines compare every field as an optional string. The rules:
//!
//! - enumerations render as their variant name, never an ordinal;
//! - ids render as decimal integers;
//! - text renders verbatim, except that empty or whitespace-only text is
//!   treated as absent, so `None` and `Some("")` compare equal.
//!
//! Fields are listed in a fixed order per entity kind; redline output
//! follows that order.

use crate::fields::{EntityFields, RequirementFields, TestCaseFields};
use crate::identity::EntityKind;

/// Requirement fields in redline order.
pub const REQUIREMENT_FIELDS: &[&str] = &["Type", "Title", "Description", "ParentId", "Status"];

/// Test case fields in redline order.
pub const TEST_CASE_FIELDS: &[&str] = &["Title", "Description", "Steps", "ExpectedResult"];

/// One field of a snapshot reduced to its canonical string form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalField {
    pub name: &'static str,
    pub value: Option<String>,
}

impl CanonicalField {
    pub fn new(name: &'static str, value: Option<String>) -> Self {
        Self {
            name,
            value: value.and_then(|v| canonical_text(&v)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// Canonical form of a free-text value: `None` when blank.
pub fn canonical_text(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// An entity field set with a fixed, ordered schema.
pub trait FieldSchema {
    /// Field names in redline order.
    const FIELDS: &'static [&'static str];

    /// The canonical form of every field, in [`Self::FIELDS`] order.
    fn canonical_fields(&self) -> Vec<CanonicalField>;
}

impl FieldSchema for RequirementFields {
    const FIELDS: &'static [&'static str] = REQUIREMENT_FIELDS;

    fn canonical_fields(&self) -> Vec<CanonicalField> {
        vec![
            CanonicalField::new("Type", Some(self.requirement_type.name().to_string())),
            CanonicalField::new("Title", Some(self.title.clone())),
            CanonicalField::new("Description", self.description.clone()),
            CanonicalField::new("ParentId", self.parent_id.map(|id| id.to_string())),
            CanonicalField::new("Status", Some(self.status.name().to_string())),
        ]
    }
}

impl FieldSchema for TestCaseFields {
    const FIELDS: &'static [&'static str] = TEST_CASE_FIELDS;

    fn canonical_fields(&self) -> Vec<CanonicalField> {
        vec![
            CanonicalField::new("Title", Some(self.title.clone())),
            CanonicalField::new("Description", self.description.clone()),
            CanonicalField::new("Steps", self.steps.clone()),
            CanonicalField::new("ExpectedResult", self.expected_result.clone()),
        ]
    }
}

impl EntityFields {
    pub fn canonical_fields(&self) -> Vec<CanonicalField> {
        match self {
            Self::Requirement(r) => r.canonical_fields(),
            Self::TestCase(t) => t.canonical_fields(),
        }
    }
}

impl EntityKind {
    /// Field names of this kind in redline order.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::Requirement => RequirementFields::FIELDS,
            Self::TestCase => TestCaseFields::FIELDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{RequirementStatus, RequirementType};
    use crate::identity::EntityId;

    #[test]
    fn canonical_order_matches_schema() {
        let req = RequirementFields::default();
        let names: Vec<_> = req.canonical_fields().iter().map(|f| f.name).collect();
        assert_eq!(names, REQUIREMENT_FIELDS);

        let tc = TestCaseFields::default();
        let names: Vec<_> = tc.canonical_fields().iter().map(|f| f.name).collect();
        assert_eq!(names, TEST_CASE_FIELDS);
    }

    #[test]
    fn blank_text_is_empty() {
        assert_eq!(canonical_text(""), None);
        assert_eq!(canonical_text("  \n\t"), None);
        assert_eq!(canonical_text(" x "), Some(" x ".to_string()));
        assert!(CanonicalField::new("Steps", Some(String::new())).is_empty());
    }

    #[test]
    fn enums_and_ids_render_by_name() {
        let req = RequirementFields {
            requirement_type: RequirementType::NonFunctional,
            title: "Latency".into(),
            description: Some("p99 under 200ms".into()),
            parent_id: Some(EntityId::new(42)),
            status: RequirementStatus::Approved,
        };
        let values: Vec<_> = req
            .canonical_fields()
            .into_iter()
            .map(|f| f.value)
            .collect();
        assert_eq!(
            values,
            vec![
                Some("NonFunctional".to_string()),
                Some("Latency".to_string()),
                Some("p99 under 200ms".to_string()),
                Some("42".to_string()),
                Some("Approved".to_string()),
            ]
        );
    }

    #[test]
    fn kind_field_names() {
        assert_eq!(EntityKind::Requirement.field_names().len(), 5);
        assert_eq!(EntityKind::TestCase.field_names()[3], "ExpectedResult");
    }
}
