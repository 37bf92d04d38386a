use std::path::{Path, PathBuf};

use rtm_store::SyncMode;
use serde::{Deserialize, Serialize};

use crate::error::{VersioningError, VersioningResult};

/// Configuration for the versioning service and its file-backed log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Total attempts `record_version_with_retry` makes before reporting a
    /// write conflict. The default of 2 is one retry.
    pub append_attempts: u32,
    /// When `true`, recording a field state identical to the latest version
    /// returns that version instead of appending a new one.
    pub skip_unchanged: bool,
    /// Location of the version log used by the CLI.
    pub log_path: PathBuf,
    /// Flush strategy of the version log.
    pub sync_mode: SyncMode,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            append_attempts: 2,
            skip_unchanged: false,
            log_path: PathBuf::from("rtm-versions.log"),
            sync_mode: SyncMode::default(),
        }
    }
}

impl VersioningConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> VersioningResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| VersioningError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> VersioningResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| VersioningError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> VersioningResult<()> {
        if self.append_attempts == 0 {
            return Err(VersioningError::Config(
                "append_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = VersioningConfig::default();
        assert_eq!(c.append_attempts, 2);
        assert!(!c.skip_unchanged);
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = VersioningConfig::from_toml_str("skip_unchanged = true\n").unwrap();
        assert!(c.skip_unchanged);
        assert_eq!(c.append_attempts, 2);
    }

    #[test]
    fn full_toml() {
        let c = VersioningConfig::from_toml_str(
            r#"
            append_attempts = 5
            log_path = "/var/lib/rtm/versions.log"
            sync_mode = "EveryWrite"
            "#,
        )
        .unwrap();
        assert_eq!(c.append_attempts, 5);
        assert_eq!(c.log_path, PathBuf::from("/var/lib/rtm/versions.log"));
        assert_eq!(c.sync_mode, SyncMode::EveryWrite);
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = VersioningConfig::from_toml_str("append_attempts = 0").unwrap_err();
        assert!(matches!(err, VersioningError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rtm.toml");
        std::fs::write(&path, "append_attempts = 3").unwrap();
        assert_eq!(VersioningConfig::load(&path).unwrap().append_attempts, 3);
        assert!(VersioningConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
