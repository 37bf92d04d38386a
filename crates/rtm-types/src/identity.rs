use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Integer identifier of a requirement or test case row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of versioned entity.
///
/// Requirements and test cases are numbered independently, so an
/// [`EntityId`] alone does not identify an entity; see [`EntityKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Requirement,
    TestCase,
}

impl EntityKind {
    /// Short prefix used in human-readable keys (`REQ-12`, `TC-4`).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Requirement => "REQ",
            Self::TestCase => "TC",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Requirement => "Requirement",
            Self::TestCase => "TestCase",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "requirement" | "req" => Ok(Self::Requirement),
            "testcase" | "test-case" | "tc" => Ok(Self::TestCase),
            _ => Err(TypeError::UnknownVariant {
                kind: "EntityKind",
                value: s.to_string(),
            }),
        }
    }
}

/// Identity of a versioned entity: its kind plus its row id.
///
/// This is the key of every version log. Two snapshots describe the same
/// entity exactly when their keys are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityKey {
    pub const fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }

    pub const fn requirement(id: i64) -> Self {
        Self::new(EntityKind::Requirement, EntityId::new(id))
    }

    pub const fn test_case(id: i64) -> Self {
        Self::new(EntityKind::TestCase, EntityId::new(id))
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({self})")
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for EntityKey {
    type Err = TypeError;

    /// Parse a human-readable key such as `REQ-12` or `tc-4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) = s
            .rsplit_once('-')
            .ok_or_else(|| TypeError::InvalidKey(s.to_string()))?;
        let kind = prefix.parse::<EntityKind>()?;
        let id = id
            .parse::<i64>()
            .map_err(|_| TypeError::InvalidKey(s.to_string()))?;
        Ok(Self::new(kind, EntityId::new(id)))
    }
}

/// Identifier of the user who made an edit.
///
/// Opaque to the core; the identity provider decides its format.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
