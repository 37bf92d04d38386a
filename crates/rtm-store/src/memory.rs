use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rtm_types::{EntityKey, VersionNumber, VersionedSnapshot};

use crate::error::{StoreError, StoreResult};
use crate::traits::VersionStore;

/// Per-entity version logs, shared by the in-memory and file backends.
///
/// Each log is a `Vec` whose index `i` holds version `i + 1`, which makes the
/// gapless invariant structural.
#[derive(Default)]
pub(crate) struct VersionIndex {
    logs: HashMap<EntityKey, Vec<VersionedSnapshot>>,
}

impl VersionIndex {
    /// Check that `snapshot` may be appended without inserting it.
    pub(crate) fn check_append(&self, snapshot: &VersionedSnapshot) -> StoreResult<()> {
        let latest = self.latest(&snapshot.key);
        let version = snapshot.version.get();
        if version <= latest {
            return Err(StoreError::DuplicateVersion {
                key: snapshot.key,
                version: snapshot.version,
            });
        }
        let expected = VersionNumber::after(latest);
        if snapshot.version != expected {
            return Err(StoreError::VersionGap {
                key: snapshot.key,
                expected,
                actual: snapshot.version,
            });
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, snapshot: VersionedSnapshot) -> StoreResult<()> {
        self.check_append(&snapshot)?;
        self.logs.entry(snapshot.key).or_default().push(snapshot);
        Ok(())
    }

    pub(crate) fn get(&self, key: &EntityKey, version: VersionNumber) -> Option<&VersionedSnapshot> {
        let index = version.get() as usize - 1;
        self.logs.get(key).and_then(|log| log.get(index))
    }

    pub(crate) fn latest(&self, key: &EntityKey) -> u32 {
        self.logs.get(key).map_or(0, |log| log.len() as u32)
    }

    pub(crate) fn list(&self, key: &EntityKey) -> Vec<VersionedSnapshot> {
        self.logs.get(key).cloned().unwrap_or_default()
    }

    pub(crate) fn keys(&self) -> Vec<EntityKey> {
        let mut keys: Vec<EntityKey> = self.logs.keys().copied().collect();
        keys.sort();
        keys
    }

    pub(crate) fn snapshot_count(&self) -> usize {
        self.logs.values().map(Vec::len).sum()
    }
}

/// In-memory, HashMap-based version store.
///
/// Intended for tests and embedding. All logs are held behind a `RwLock`;
/// the write lock spans the duplicate check and the insert, so concurrent
/// appends of the same (key, version) see exactly one winner.
pub struct InMemoryVersionStore {
    index: RwLock<VersionIndex>,
}

impl InMemoryVersionStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            index: RwLock::new(VersionIndex::default()),
        }
    }

    /// Total number of snapshots across all entities.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_index()?.snapshot_count())
    }

    /// Returns `true` if the store holds no snapshots.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read_index(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, VersionIndex>> {
        self.index
            .read()
            .map_err(|_| StoreError::Unavailable("version index lock poisoned".into()))
    }
}

impl Default for InMemoryVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
    async fn append(&self, snapshot: &VersionedSnapshot) -> StoreResult<()> {
        let mut index = self
            .index
            .write()
            .map_err(|_| StoreError::Unavailable("version index lock poisoned".into()))?;
        index.insert(snapshot.clone())
    }

    async fn get_by_version(
        &self,
        key: &EntityKey,
        version: VersionNumber,
    ) -> StoreResult<Option<VersionedSnapshot>> {
        Ok(self.read_index()?.get(key, version).cloned())
    }

    async fn latest_version_number(&self, key: &EntityKey) -> StoreResult<u32> {
        Ok(self.read_index()?.latest(key))
    }

    async fn list_versions(&self, key: &EntityKey) -> StoreResult<Vec<VersionedSnapshot>> {
        Ok(self.read_index()?.list(key))
    }

    async fn keys(&self) -> StoreResult<Vec<EntityKey>> {
        Ok(self.read_index()?.keys())
    }
}

impl std::fmt::Debug for InMemoryVersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVersionStore")
            .field("snapshot_count", &self.len().ok())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rtm_types::{RequirementFields, RequirementStatus, UserId};
    use std::sync::Arc;

    pub(crate) fn snapshot(key: EntityKey, version: u32, title: &str) -> VersionedSnapshot {
        VersionedSnapshot::new(
            key,
            VersionNumber::new(version).unwrap(),
            RequirementFields {
                title: title.into(),
                status: RequirementStatus::Draft,
                ..Default::default()
            }
            .into(),
            UserId::new("alice"),
            DateTime::<Utc>::from_timestamp(1_700_000_000 + version as i64, 0).unwrap(),
        )
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn append_and_read_back() {
        let store = InMemoryVersionStore::new();
        let key = EntityKey::requirement(1);
        let snap = snapshot(key, 1, "Login");
        store.append(&snap).await.unwrap();

        let read = store
            .get_by_version(&key, VersionNumber::FIRST)
            .await
            .unwrap()
            .expect("should exist");
        assert_eq!(read, snap);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_version_is_none() {
        let store = InMemoryVersionStore::new();
        let key = EntityKey::requirement(1);
        store.append(&snapshot(key, 1, "Login")).await.unwrap();

        let missing = store
            .get_by_version(&key, VersionNumber::new(2).unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());

        let other = store
            .get_by_version(&EntityKey::test_case(1), VersionNumber::FIRST)
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn latest_is_zero_for_unknown_entity() {
        let store = InMemoryVersionStore::new();
        let latest = store
            .latest_version_number(&EntityKey::requirement(99))
            .await
            .unwrap();
        assert_eq!(latest, 0);
    }

    #[tokio::test]
    async fn latest_tracks_appends() {
        let store = InMemoryVersionStore::new();
        let key = EntityKey::requirement(1);
        for v in 1..=3 {
            store.append(&snapshot(key, v, "Login")).await.unwrap();
        }
        assert_eq!(store.latest_version_number(&key).await.unwrap(), 3);
        let versions: Vec<u32> = store
            .list_versions(&key)
            .await
            .unwrap()
            .iter()
            .map(|s| s.version.get())
            .collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    // -----------------------------------------------------------------------
    // Append invariants
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn duplicate_version_is_rejected() {
        let store = InMemoryVersionStore::new();
        let key = EntityKey::requirement(1);
        store.append(&snapshot(key, 1, "Login")).await.unwrap();

        let err = store.append(&snapshot(key, 1, "Logout")).await.unwrap_err();
        assert!(err.is_duplicate());

        // The original is untouched.
        let kept = store
            .get_by_version(&key, VersionNumber::FIRST)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.fields.title(), "Login");
    }

    #[tokio::test]
    async fn gap_is_rejected() {
        let store = InMemoryVersionStore::new();
        let key = EntityKey::requirement(1);
        let err = store.append(&snapshot(key, 2, "Login")).await.unwrap_err();
        match err {
            StoreError::VersionGap {
                expected, actual, ..
            } => {
                assert_eq!(expected, VersionNumber::FIRST);
                assert_eq!(actual.get(), 2);
            }
            other => panic!("expected VersionGap, got {other:?}"),
        }
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn keys_are_sorted() {
        let store = InMemoryVersionStore::new();
        store
            .append(&snapshot(EntityKey::requirement(5), 1, "b"))
            .await
            .unwrap();
        store
            .append(&snapshot(EntityKey::requirement(2), 1, "a"))
            .await
            .unwrap();
        assert_eq!(
            store.keys().await.unwrap(),
            vec![EntityKey::requirement(2), EntityKey::requirement(5)]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_appends_have_one_winner() {
        let store = Arc::new(InMemoryVersionStore::new());
        let key = EntityKey::requirement(1);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append(&snapshot(key, 1, &format!("writer-{i}"))).await
            }));
        }

        let mut ok = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(e) if e.is_duplicate() => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn poisoned_lock_is_reported_not_empty() {
        let store = Arc::new(InMemoryVersionStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.index.write().unwrap();
            panic!("poison the index lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(store.is_empty().is_err());
    }
}
