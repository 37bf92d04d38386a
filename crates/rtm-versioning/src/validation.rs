use rtm_types::{EntityKey, VersionedSnapshot};

/// Result of version-history validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryReport {
    pub key: EntityKey,
    pub version_count: usize,
    pub sequence_gapless: bool,
    pub single_entity: bool,
    pub timestamps_ordered: bool,
    pub violations: Vec<Violation>,
}

impl HistoryReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific invariant violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Position in the history (1-based), not the stored version number.
    pub position: usize,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    ForeignEntity,
    KindMismatch,
    TimestampRegression,
}

/// Version-history validator.
///
/// Checks that a history is exactly versions `1..=N` of one entity, that
/// each snapshot's fields match the entity kind, and that modification
/// times never go backwards.
pub struct HistoryValidator;

impl HistoryValidator {
    /// Validate an ascending list of snapshots belonging to `key`.
    pub fn validate(key: EntityKey, snapshots: &[VersionedSnapshot]) -> HistoryReport {
        let mut violations = Vec::new();
        let mut sequence_gapless = true;
        let mut single_entity = true;
        let mut timestamps_ordered = true;

        for (index, snapshot) in snapshots.iter().enumerate() {
            let position = index + 1;

            if snapshot.version.get() as usize != position {
                sequence_gapless = false;
                violations.push(Violation {
                    position,
                    kind: ViolationKind::SequenceGap,
                    description: format!(
                        "expected version {position}, got {}",
                        snapshot.version
                    ),
                });
            }

            if snapshot.key != key {
                single_entity = false;
                violations.push(Violation {
                    position,
                    kind: ViolationKind::ForeignEntity,
                    description: format!("snapshot belongs to {}", snapshot.key),
                });
            }

            if snapshot.fields.kind() != snapshot.key.kind {
                violations.push(Violation {
                    position,
                    kind: ViolationKind::KindMismatch,
                    description: format!(
                        "{} fields stored under {}",
                        snapshot.fields.kind(),
                        snapshot.key
                    ),
                });
            }

            if let Some(prev) = index.checked_sub(1).map(|i| &snapshots[i]) {
                if snapshot.modified_at < prev.modified_at {
                    timestamps_ordered = false;
                    violations.push(Violation {
                        position,
                        kind: ViolationKind::TimestampRegression,
                        description: format!(
                            "modified at {} before previous version at {}",
                            snapshot.modified_at, prev.modified_at
                        ),
                    });
                }
            }
        }

        HistoryReport {
            key,
            version_count: snapshots.len(),
            sequence_gapless,
            single_entity,
            timestamps_ordered,
            violations,
        }
    }
}
