use chrono::Utc;
use rtm_diff::{RedlineEngine, RedlineResult};
use rtm_store::VersionStore;
use rtm_types::{EntityFields, EntityKey, UserId, VersionNumber, VersionedSnapshot};
use tracing::{debug, info, warn};

use crate::config::VersioningConfig;
use crate::error::{VersioningError, VersioningResult};
use crate::validation::{HistoryReport, HistoryValidator};

/// Records snapshots on edit and answers "what changed" queries.
///
/// The service keeps no version counters: the next version number is always
/// read from the store (`latest + 1`), and the store's duplicate rejection
/// arbitrates concurrent writers.
pub struct VersioningService<S> {
    store: S,
    engine: RedlineEngine,
    config: VersioningConfig,
}

impl<S: VersionStore> VersioningService<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, VersioningConfig::default())
    }

    pub fn with_config(store: S, config: VersioningConfig) -> Self {
        Self {
            store,
            engine: RedlineEngine::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    // ---- Recording ----

    /// Append the full post-edit field state of `key` as its next version.
    ///
    /// Makes a single attempt. If another writer took the computed version
    /// number first this fails with [`VersioningError::DuplicateVersion`];
    /// see [`Self::record_version_with_retry`].
    pub async fn record_version(
        &self,
        key: EntityKey,
        fields: EntityFields,
        modified_by: UserId,
    ) -> VersioningResult<VersionedSnapshot> {
        let latest = self.store.latest_version_number(&key).await?;

        let current = VersionNumber::from_latest(latest).filter(|_| self.config.skip_unchanged);
        if let Some(current) = current {
            let current = self.load(&key, current).await?;
            if current.canonical_fields() == fields.canonical_fields() {
                debug!(%key, version = latest, "unchanged edit; keeping latest version");
                return Ok(current);
            }
        }

        let snapshot = VersionedSnapshot::new(
            key,
            VersionNumber::after(latest),
            fields,
            modified_by,
            Utc::now(),
        )?;
        self.store.append(&snapshot).await?;

        info!(
            %key,
            version = snapshot.version.get(),
            user = %snapshot.modified_by,
            "version recorded"
        );
        Ok(snapshot)
    }

    /// [`Self::record_version`], recomputing the version number after a
    /// duplicate-version race.
    ///
    /// Makes up to `append_attempts` attempts, then fails with
    /// [`VersioningError::WriteConflict`]. Other errors are returned at once.
    pub async fn record_version_with_retry(
        &self,
        key: EntityKey,
        fields: EntityFields,
        modified_by: UserId,
    ) -> VersioningResult<VersionedSnapshot> {
        let attempts = self.config.append_attempts.max(1);
        for attempt in 1..=attempts {
            match self
                .record_version(key, fields.clone(), modified_by.clone())
                .await
            {
                Err(VersioningError::DuplicateVersion { version, .. }) => {
                    warn!(%key, version = version.get(), attempt, "version number taken");
                }
                other => return other,
            }
        }
        Err(VersioningError::WriteConflict { key, attempts })
    }

    // ---- Queries ----

    /// Field-level redline between two versions of `key`.
    ///
    /// The lower version number is always treated as the old side, so
    /// `Added`/`Removed` follow chronological order whatever the argument
    /// order. The result is labelled the same way: for `get_redline(k, 5, 2)`
    /// `old_version` is 2 and `new_version` is 5, not the arguments as
    /// passed. Equal numbers yield an empty change list.
    pub async fn get_redline(
        &self,
        key: EntityKey,
        a: VersionNumber,
        b: VersionNumber,
    ) -> VersioningResult<RedlineResult> {
        let (old_version, new_version) = if a <= b { (a, b) } else { (b, a) };

        let old = self.load(&key, old_version).await?;
        let new = if new_version == old_version {
            old.clone()
        } else {
            self.load(&key, new_version).await?
        };

        let result = self.engine.compare(&old, &new)?;
        debug!(
            %key,
            old = old_version.get(),
            new = new_version.get(),
            changes = result.len(),
            "redline computed"
        );
        Ok(result)
    }

    /// Redline of the most recent edit, or `None` if `key` has fewer than
    /// two versions.
    pub async fn redline_latest(&self, key: EntityKey) -> VersioningResult<Option<RedlineResult>> {
        let latest = self.store.latest_version_number(&key).await?;
        let Some(new) = VersionNumber::from_latest(latest) else {
            return Ok(None);
        };
        let Some(old) = new.prev() else {
            return Ok(None);
        };
        self.get_redline(key, old, new).await.map(Some)
    }

    /// The most recent snapshot of `key`.
    pub async fn latest(&self, key: EntityKey) -> VersioningResult<Option<VersionedSnapshot>> {
        let latest = self.store.latest_version_number(&key).await?;
        match VersionNumber::from_latest(latest) {
            Some(version) => self.load(&key, version).await.map(Some),
            None => Ok(None),
        }
    }

    /// Every snapshot of `key`, oldest first.
    pub async fn history(&self, key: EntityKey) -> VersioningResult<Vec<VersionedSnapshot>> {
        Ok(self.store.list_versions(&key).await?)
    }

    /// Check the stored history of `key` against the version-log invariants.
    pub async fn validate_history(&self, key: EntityKey) -> VersioningResult<HistoryReport> {
        let snapshots = self.store.list_versions(&key).await?;
        Ok(HistoryValidator::validate(key, &snapshots))
    }

    async fn load(
        &self,
        key: &EntityKey,
        version: VersionNumber,
    ) -> VersioningResult<VersionedSnapshot> {
        let snapshot = self
            .store
            .get_by_version(key, version)
            .await?
            .ok_or(VersioningError::VersionNotFound { key: *key, version })?;
        if snapshot.key != *key {
            return Err(VersioningError::EntityMismatch {
                requested: *key,
                found: snapshot.key,
            });
        }
        Ok(snapshot)
    }
}
