use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::fields::EntityFields;
use crate::identity::{EntityKey, UserId};
use crate::schema::CanonicalField;
use crate::version::VersionNumber;

/// Immutable record of an entity's full field state at one version.
///
/// Snapshots are appended to a per-entity version log and never changed
/// afterwards. Construct them with [`VersionedSnapshot::new`], which checks
/// that the field set matches the key's entity kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedSnapshot {
    pub key: EntityKey,
    pub version: VersionNumber,
    pub fields: EntityFields,
    pub modified_by: UserId,
    pub modified_at: DateTime<Utc>,
}

impl VersionedSnapshot {
    pub fn new(
        key: EntityKey,
        version: VersionNumber,
        fields: EntityFields,
        modified_by: UserId,
        modified_at: DateTime<Utc>,
    ) -> Result<Self, TypeError> {
        if fields.kind() != key.kind {
            return Err(TypeError::KindMismatch {
                key,
                actual: fields.kind(),
            });
        }
        Ok(Self {
            key,
            version,
            fields,
            modified_by,
            modified_at,
        })
    }

    /// Canonical field values in schema order.
    pub fn canonical_fields(&self) -> Vec<CanonicalField> {
        self.fields.canonical_fields()
    }

    /// Returns `true` if both snapshots hold the same canonical field values,
    /// ignoring version and authorship.
    pub fn same_content(&self, other: &Self) -> bool {
        self.key == other.key && self.canonical_fields() == other.canonical_fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{RequirementFields, TestCaseFields};
    use crate::identity::EntityKind;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let err = VersionedSnapshot::new(
            EntityKey::requirement(1),
            VersionNumber::FIRST,
            TestCaseFields::default().into(),
            UserId::new("alice"),
            at(0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TypeError::KindMismatch {
                key: EntityKey::requirement(1),
                actual: EntityKind::TestCase,
            }
        );
    }

    #[test]
    fn same_content_ignores_authorship() {
        let fields: EntityFields = RequirementFields {
            title: "Login".into(),
            ..Default::default()
        }
        .into();
        let a = VersionedSnapshot::new(
            EntityKey::requirement(1),
            VersionNumber::FIRST,
            fields.clone(),
            UserId::new("alice"),
            at(10),
        )
        .unwrap();
        let b = VersionedSnapshot::new(
            EntityKey::requirement(1),
            VersionNumber::new(2).unwrap(),
            fields,
            UserId::new("bob"),
            at(20),
        )
        .unwrap();
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn blank_description_matches_missing_description() {
        let key = EntityKey::test_case(3);
        let a = VersionedSnapshot::new(
            key,
            VersionNumber::FIRST,
            TestCaseFields {
                title: "Smoke".into(),
                description: Some(String::new()),
                ..Default::default()
            }
            .into(),
            UserId::new("alice"),
            at(0),
        )
        .unwrap();
        let b = VersionedSnapshot {
            fields: TestCaseFields {
                title: "Smoke".into(),
                ..Default::default()
            }
            .into(),
            ..a.clone()
        };
        assert!(a.same_content(&b));
    }

    #[test]
    fn serde_roundtrip() {
        let snap = VersionedSnapshot::new(
            EntityKey::requirement(5),
            VersionNumber::new(3).unwrap(),
            RequirementFields::default().into(),
            UserId::new("carol"),
            at(1_700_000_000),
        )
        .unwrap();
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains(r#""modifiedBy":"carol""#));
        let parsed: VersionedSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snap);
    }
}
