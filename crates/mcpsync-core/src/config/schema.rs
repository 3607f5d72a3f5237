//! Configuration schema for `config.toml`
//!
//! ```toml
//! [backups]
//! path = "~/.config/mcpsync/backups"
//! retention = 10
//!
//! [clients.cursor]
//! config_path = "~/.cursor/mcp.json"
//!
//! [clients.cody]
//! config_path = "~/.config/Code/User/settings.json"
//! format = "vscode"
//! key = "openctx.providers"
//!
//! [sync]
//! token = "ghp_..."
//! snippet_id = "..."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DocumentFormat;

use super::paths;

/// Root configuration structure for config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backups: BackupSettings,

    /// Explicitly configured clients, keyed by client name
    #[serde(default)]
    pub clients: BTreeMap<String, ClientTarget>,

    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Backup directory; defaults to `backups/` next to config.toml
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Backups kept per client. 0 keeps everything.
    #[serde(default)]
    pub retention: usize,
}

/// One client file the canonical servers are applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTarget {
    /// Absolute or `~`-relative path of the client's configuration file
    pub config_path: String,

    /// Document format; inferred from the path and client name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DocumentFormat>,

    /// Override for where the server collection lives inside the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, target) in &self.clients {
            target
                .validate()
                .with_context(|| format!("Invalid client configuration: '{}'", name))?;
        }
        if let Some(path) = &self.backups.path
            && path.trim().is_empty()
        {
            anyhow::bail!("backups.path cannot be empty");
        }
        Ok(())
    }
}

impl ClientTarget {
    pub fn new(config_path: impl Into<String>, format: Option<DocumentFormat>) -> Self {
        Self {
            config_path: config_path.into(),
            format,
            key: None,
        }
    }

    pub fn from_path(path: &Path, format: Option<DocumentFormat>) -> Self {
        Self::new(path.to_string_lossy().into_owned(), format)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.config_path.trim().is_empty() {
            anyhow::bail!("config_path cannot be empty");
        }
        if let Some(key) = &self.key
            && key.trim().is_empty()
        {
            anyhow::bail!("key cannot be empty when set");
        }
        Ok(())
    }

    /// Expand `~` and make the configured path absolute.
    pub fn resolve_path(&self) -> anyhow::Result<PathBuf> {
        paths::expand_path(&self.config_path)
    }

    /// Configured format, or the one inferred from `path` and the client name.
    pub fn resolve_format(&self, client_name: &str, path: &Path) -> Option<DocumentFormat> {
        self.format
            .or_else(|| DocumentFormat::infer(client_name, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_path_is_invalid() {
        let mut config = AppConfig::new();
        config
            .clients
            .insert("broken".to_string(), ClientTarget::new("  ", None));

        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("'broken'"));
    }

    #[test]
    fn empty_key_is_invalid() {
        let target = ClientTarget::new("/tmp/settings.json", None).with_key("");
        assert!(target.validate().is_err());
    }

    #[test]
    fn configured_format_wins_over_inference() {
        let target = ClientTarget::new("/tmp/config.json", Some(DocumentFormat::Continue));
        assert_eq!(
            target.resolve_format("cursor", Path::new("/tmp/config.json")),
            Some(DocumentFormat::Continue)
        );

        let target = ClientTarget::new("/tmp/config.json", None);
        assert_eq!(
            target.resolve_format("cursor", Path::new("/tmp/config.json")),
            Some(DocumentFormat::SimpleJson)
        );
    }
}
