//! The canonical server set (`mcp.json`).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec;
use crate::fs::write_atomic;
use crate::mcp::ServerSpec;

/// Single source of truth: server name to definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalConfig {
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: BTreeMap<String, ServerSpec>,

    /// Other top-level keys, carried through load/save untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanonicalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_names(&self) -> BTreeSet<String> {
        self.mcp_servers.keys().cloned().collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.mcp_servers
            .iter()
            .flat_map(|(name, spec)| spec.warnings(name))
            .collect()
    }
}

/// Loads and atomically saves the canonical server set.
#[derive(Debug, Clone)]
pub struct CanonicalStore {
    path: PathBuf,
}

impl CanonicalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the canonical set. A missing file is an empty set.
    pub fn load(&self) -> anyhow::Result<CanonicalConfig> {
        if !self.path.exists() {
            return Ok(CanonicalConfig::new());
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read canonical config: {}", self.path.display()))?;
        let doc = codec::parse_jsonc(&bytes)
            .with_context(|| format!("Failed to parse canonical config: {}", self.path.display()))?;

        serde_json::from_value(Value::Object(doc)).with_context(|| {
            format!(
                "Invalid server definitions in canonical config: {}",
                self.path.display()
            )
        })
    }

    pub fn save(&self, config: &CanonicalConfig) -> anyhow::Result<()> {
        let mut bytes =
            serde_json::to_vec_pretty(config).context("Failed to serialize canonical config")?;
        bytes.push(b'\n');
        write_atomic(&self.path, &bytes).with_context(|| {
            format!("Failed to write canonical config: {}", self.path.display())
        })?;
        tracing::debug!(path = %self.path.display(), "Saved canonical config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_set() {
        let temp = TempDir::new().unwrap();
        let store = CanonicalStore::new(temp.path().join("mcp.json"));
        assert!(store.load().unwrap().mcp_servers.is_empty());
    }

    #[test]
    fn loads_jsonc_and_keeps_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mcp.json");
        std::fs::write(
            &path,
            r#"{
                // managed by hand
                "$schema": "https://example.com/schema.json",
                "mcpServers": {
                    "git": {"command": "uvx", "args": ["mcp-server-git"],},
                },
            }"#,
        )
        .unwrap();

        let store = CanonicalStore::new(&path);
        let config = store.load().unwrap();
        assert_eq!(config.mcp_servers["git"].command(), Some("uvx"));

        store.save(&config).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\"$schema\""));
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mcp.json");
        std::fs::write(&path, r#"{"mcpServers": {"#).unwrap();

        let err = CanonicalStore::new(&path).load().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse canonical config"));
    }

    #[test]
    fn wrong_typed_server_is_a_load_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mcp.json");
        std::fs::write(&path, r#"{"mcpServers": {"bad": {"args": "not-a-list"}}}"#).unwrap();

        assert!(CanonicalStore::new(&path).load().is_err());
    }

    #[test]
    fn collects_spec_warnings() {
        let mut config = CanonicalConfig::new();
        config
            .mcp_servers
            .insert("empty".to_string(), ServerSpec::default());
        config
            .mcp_servers
            .insert("ok".to_string(), ServerSpec::stdio("echo", vec![]));

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'empty'"));
    }
}
