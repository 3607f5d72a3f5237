//! Merge externally supplied `{ "mcpServers": { ... } }` content into the
//! canonical store.

use serde_json::Value;

use crate::codec;
use crate::mcp::ServerSpec;

use super::canonical::CanonicalStore;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("nothing to import: input is empty")]
    Empty,

    #[error("could not parse import content: {0}")]
    Parse(#[source] codec::CodecError),

    #[error("import content has no top-level 'mcpServers' object")]
    MissingServers,

    #[error("server '{name}' is not a valid definition: {reason}")]
    InvalidEntry { name: String, reason: String },

    #[error("failed to update the canonical store: {0:#}")]
    Store(anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Names merged, in document order
    pub merged: Vec<String>,
    pub count: usize,
}

/// Merge every entry of the content's `mcpServers` object into the store.
///
/// Imported entries overwrite canonical entries of the same name. Nothing is
/// written unless every entry is valid.
pub fn import_servers(store: &CanonicalStore, content: &str) -> Result<ImportReport, ImportError> {
    if content.trim().is_empty() {
        return Err(ImportError::Empty);
    }

    let doc = codec::parse_jsonc(content.as_bytes()).map_err(ImportError::Parse)?;
    let servers = match doc.get("mcpServers") {
        Some(Value::Object(servers)) => servers,
        _ => return Err(ImportError::MissingServers),
    };

    let mut incoming = Vec::with_capacity(servers.len());
    for (name, value) in servers {
        if !value.is_object() {
            return Err(ImportError::InvalidEntry {
                name: name.clone(),
                reason: "expected an object".to_string(),
            });
        }
        let spec: ServerSpec =
            serde_json::from_value(value.clone()).map_err(|e| ImportError::InvalidEntry {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        for warning in spec.warnings(name) {
            tracing::warn!("{}", warning);
        }
        incoming.push((name.clone(), spec));
    }

    if incoming.is_empty() {
        return Ok(ImportReport::default());
    }

    let mut config = store.load().map_err(ImportError::Store)?;
    let mut merged = Vec::with_capacity(incoming.len());
    for (name, spec) in incoming {
        if config.mcp_servers.insert(name.clone(), spec).is_some() {
            tracing::debug!(server = %name, "Import overwrites existing server");
        }
        merged.push(name);
    }
    store.save(&config).map_err(ImportError::Store)?;

    tracing::info!(
        count = merged.len(),
        path = %store.path().display(),
        "Imported servers into canonical config"
    );
    Ok(ImportReport {
        count: merged.len(),
        merged,
    })
}
