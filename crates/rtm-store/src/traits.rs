use std::sync::Arc;

use async_trait::async_trait;
use rtm_types::{EntityKey, VersionNumber, VersionedSnapshot};

use crate::error::StoreResult;

/// Append-only store of entity snapshots keyed by (entity, version).
///
/// All implementations must satisfy these invariants:
/// - Snapshots are immutable once appended; there is no update or delete.
/// - For every key the stored versions are exactly `1..=latest`.
/// - `append` rejects an existing (key, version) with
///   [`StoreError::DuplicateVersion`](crate::StoreError::DuplicateVersion),
///   so concurrent writers fail instead of overwriting each other.
/// - I/O failures are propagated verbatim, never retried here.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Durably store a new snapshot.
    async fn append(&self, snapshot: &VersionedSnapshot) -> StoreResult<()>;

    /// Read one snapshot.
    ///
    /// Returns `Ok(None)` if the version does not exist.
    async fn get_by_version(
        &self,
        key: &EntityKey,
        version: VersionNumber,
    ) -> StoreResult<Option<VersionedSnapshot>>;

    /// Highest recorded version number, or 0 if the entity has none.
    async fn latest_version_number(&self, key: &EntityKey) -> StoreResult<u32>;

    /// Every snapshot of the entity in ascending version order.
    async fn list_versions(&self, key: &EntityKey) -> StoreResult<Vec<VersionedSnapshot>>;

    /// All entity keys with at least one version, sorted.
    async fn keys(&self) -> StoreResult<Vec<EntityKey>>;
}

#[async_trait]
impl<S: VersionStore + ?Sized> VersionStore for Arc<S> {
    async fn append(&self, snapshot: &VersionedSnapshot) -> StoreResult<()> {
        (**self).append(snapshot).await
    }

    async fn get_by_version(
        &self,
        key: &EntityKey,
        version: VersionNumber,
    ) -> StoreResult<Option<VersionedSnapshot>> {
        (**self).get_by_version(key, version).await
    }

    async fn latest_version_number(&self, key: &EntityKey) -> StoreResult<u32> {
        (**self).latest_version_number(key).await
    }

    async fn list_versions(&self, key: &EntityKey) -> StoreResult<Vec<VersionedSnapshot>> {
        (**self).list_versions(key).await
    }

    async fn keys(&self) -> StoreResult<Vec<EntityKey>> {
        (**self).keys().await
    }
}
