//! Config store for loading and saving config.toml and locating the files
//! that live next to it.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::backup::BackupStore;
use crate::fs::write_atomic;

use super::{AppConfig, CanonicalStore, parser, paths};

pub const CONFIG_FILE: &str = "config.toml";
pub const CANONICAL_FILE: &str = "mcp.json";
const BACKUP_DIR: &str = "backups";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at `<config_dir>/mcpsync`.
    pub fn from_default_dir() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("mcpsync");
        Ok(Self::from_paths(config_dir))
    }

    pub fn from_paths(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.config_dir.join(CANONICAL_FILE)
    }

    pub fn canonical(&self) -> CanonicalStore {
        CanonicalStore::new(self.canonical_path())
    }

    pub fn load(&self) -> anyhow::Result<AppConfig> {
        let config_path = self.config_path();
        if !config_path.exists() {
            return Ok(AppConfig::new());
        }
        parser::parse_config(&config_path)
    }

    pub fn save(&self, config: &AppConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        let config_path = self.config_path();
        write_atomic(&config_path, content.as_bytes())
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        Ok(())
    }

    /// Backup directory from `[backups] path`, or `backups/` in the config dir.
    pub fn backup_dir(&self, config: &AppConfig) -> anyhow::Result<PathBuf> {
        match &config.backups.path {
            Some(raw) => paths::expand_path(raw)
                .with_context(|| format!("Invalid backups.path '{}'", raw)),
            None => Ok(self.config_dir.join(BACKUP_DIR)),
        }
    }

    pub fn backup_store(&self, config: &AppConfig) -> anyhow::Result<BackupStore> {
        Ok(BackupStore::new(self.backup_dir(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientTarget;
    use tempfile::TempDir;

    #[test]
    fn missing_config_loads_default() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::from_paths(temp.path().to_path_buf());
        assert_eq!(store.load().unwrap(), AppConfig::new());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::from_paths(temp.path().join("nested"));

        let mut config = AppConfig::new();
        config.clients.insert(
            "cursor".to_string(),
            ClientTarget::new("~/.cursor/mcp.json", None),
        );
        store.save(&config).unwrap();

        assert!(store.config_path().exists());
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn backup_dir_defaults_next_to_config() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::from_paths(temp.path().to_path_buf());
        let mut config = AppConfig::new();

        assert_eq!(store.backup_dir(&config).unwrap(), temp.path().join("backups"));

        let custom = temp.path().join("elsewhere");
        config.backups.path = Some(custom.to_string_lossy().into_owned());
        assert_eq!(store.backup_dir(&config).unwrap(), custom);
    }

    #[test]
    fn canonical_lives_next_to_config() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::from_paths(temp.path().to_path_buf());
        assert_eq!(store.canonical().path(), temp.path().join("mcp.json"));
    }
}
