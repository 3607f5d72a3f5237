//! Shared core types used across configuration, codec and deploy layers.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Document shape of a client's configuration file.
///
/// Each tag selects exactly one codec. `SimpleJson` is a historical alias of
/// `ClaudeDesktop`: both place servers in a root-level `mcpServers` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    /// `{ "mcpServers": { id: entry } }`
    ClaudeDesktop,
    /// Same shape as `ClaudeDesktop` (Cursor, Windsurf, Cline, ...)
    SimpleJson,
    /// `{ "mcp": { "servers": { id: entry } } }`, or a single override key
    #[serde(rename = "vscode")]
    VsCode,
    /// `{ "experimental": { "modelContextProtocolServers": [ { name, transport } ] } }`
    Continue,
    /// YAML document with a root `mcpServers` map
    Yaml,
    /// TOML document with a root `mcpServers` table
    Toml,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 6] = [
        DocumentFormat::ClaudeDesktop,
        DocumentFormat::SimpleJson,
        DocumentFormat::VsCode,
        DocumentFormat::Continue,
        DocumentFormat::Yaml,
        DocumentFormat::Toml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::ClaudeDesktop => "claude-desktop",
            DocumentFormat::SimpleJson => "simple-json",
            DocumentFormat::VsCode => "vscode",
            DocumentFormat::Continue => "continue",
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Toml => "toml",
        }
    }

    /// Guess the format of a client file when no tag was configured.
    ///
    /// YAML and TOML are recognized by extension. JSON files are told apart by
    /// the client name, falling back to the plain `mcpServers` shape.
    pub fn infer(client_name: &str, path: &Path) -> Option<DocumentFormat> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => {
                let lowered = client_name.to_lowercase();
                if lowered.contains("claude-desktop") {
                    Some(DocumentFormat::ClaudeDesktop)
                } else if lowered.contains("vscode") {
                    Some(DocumentFormat::VsCode)
                } else if lowered.contains("continue") {
                    Some(DocumentFormat::Continue)
                } else {
                    Some(DocumentFormat::SimpleJson)
                }
            }
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown document format '{}'. Expected one of: {}",
                    s,
                    DocumentFormat::ALL
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_serializes_as_kebab_case() {
        let json = serde_json::to_string(&DocumentFormat::ClaudeDesktop).unwrap();
        assert_eq!(json, "\"claude-desktop\"");

        let json = serde_json::to_string(&DocumentFormat::VsCode).unwrap();
        assert_eq!(json, "\"vscode\"");
    }

    #[test]
    fn format_parses_from_tag() {
        assert_eq!(
            "simple-json".parse::<DocumentFormat>().unwrap(),
            DocumentFormat::SimpleJson
        );
        assert_eq!("TOML".parse::<DocumentFormat>().unwrap(), DocumentFormat::Toml);
        assert!("xml".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn infer_uses_extension_then_client_name() {
        let json = Path::new("/tmp/settings.json");
        assert_eq!(
            DocumentFormat::infer("vscode-insiders", json),
            Some(DocumentFormat::VsCode)
        );
        assert_eq!(
            DocumentFormat::infer("claude-desktop", json),
            Some(DocumentFormat::ClaudeDesktop)
        );
        assert_eq!(
            DocumentFormat::infer("Continue", json),
            Some(DocumentFormat::Continue)
        );
        assert_eq!(
            DocumentFormat::infer("cursor", json),
            Some(DocumentFormat::SimpleJson)
        );
        assert_eq!(
            DocumentFormat::infer("goose", Path::new("/tmp/config.yml")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(
            DocumentFormat::infer("vibe", Path::new("/tmp/config.toml")),
            Some(DocumentFormat::Toml)
        );
        assert_eq!(DocumentFormat::infer("warp", Path::new("/tmp/mcp")), None);
    }
}
