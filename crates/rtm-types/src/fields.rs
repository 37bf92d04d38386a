//! Field sets of the versioned entities.
//!
//! Each snapshot carries the complete post-edit state of its entity. The
//! enumerations here canonicalize to their variant name (see
//! [`crate::schema`]), so reordering variants never changes a redline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{EntityId, EntityKind};

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical name of this variant.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(s))
                    .ok_or_else(|| TypeError::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }
    };
}

named_enum! {
    /// Classification of a requirement.
    pub enum RequirementType {
        Business,
        Stakeholder,
        Functional,
        NonFunctional,
        Constraint,
    }
}

named_enum! {
    /// Lifecycle status of a requirement.
    pub enum RequirementStatus {
        Draft,
        InReview,
        Approved,
        Implemented,
        Verified,
        Rejected,
        Obsolete,
    }
}

impl Default for RequirementType {
    fn default() -> Self {
        Self::Functional
    }
}

impl Default for RequirementStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Full field state of a requirement.
///
/// `parent_id` links a child requirement to its parent in the requirement
/// hierarchy by id only; the core never follows it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementFields {
    #[serde(rename = "type")]
    pub requirement_type: RequirementType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    pub status: RequirementStatus,
}

/// Full field state of a test case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseFields {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub expected_result: Option<String>,
}

/// The field state of either entity kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityFields {
    Requirement(RequirementFields),
    TestCase(TestCaseFields),
}

impl EntityFields {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Requirement(_) => EntityKind::Requirement,
            Self::TestCase(_) => EntityKind::TestCase,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Requirement(r) => &r.title,
            Self::TestCase(t) => &t.title,
        }
    }
}

impl From<RequirementFields> for EntityFields {
    fn from(fields: RequirementFields) -> Self {
        Self::Requirement(fields)
    }
}

impl From<TestCaseFields> for EntityFields {
    fn from(fields: TestCaseFields) -> Self {
        Self::TestCase(fields)
    }
}
