//! VS Code family settings: servers nested under `mcp.servers`.
//!
//! With an override key the servers live in a single top-level map under that
//! literal key instead (settings files use flat dotted keys such as
//! `openctx.providers`). Entries injected there are plain map entries; whether
//! the consuming extension understands them is up to the user.

use std::collections::BTreeSet;

use crate::mcp::ServerSpec;
use crate::types::DocumentFormat;

use super::{Codec, CodecError, Document, json, tree};

const DEFAULT_PATH: &[&str] = &["mcp", "servers"];

#[derive(Debug, Clone, Default)]
pub struct VsCodeCodec {
    key: Option<String>,
}

impl VsCodeCodec {
    pub fn new(key: Option<String>) -> Self {
        Self { key }
    }

    fn path(&self) -> Vec<&str> {
        match &self.key {
            Some(key) => vec![key.as_str()],
            None => DEFAULT_PATH.to_vec(),
        }
    }
}

impl Codec for VsCodeCodec {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::VsCode
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        json::parse_jsonc(bytes)
    }

    fn upsert(&self, doc: &mut Document, id: &str, spec: &ServerSpec) -> Result<(), CodecError> {
        // the editor's own parser expects `env` on every entry
        let entry = tree::render_entry(spec, self.key.is_none());
        tree::upsert_at(doc, &self.path(), id, entry)
    }

    fn prune(
        &self,
        doc: &mut Document,
        live: &BTreeSet<String>,
    ) -> Result<Vec<String>, CodecError> {
        tree::prune_at(doc, &self.path(), live)
    }

    fn serialize(&self, doc: &Document) -> Result<Vec<u8>, CodecError> {
        json::to_pretty_json(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn nests_under_mcp_servers_with_forced_env() {
        let codec = VsCodeCodec::default();
        let mut doc = codec
            .parse(b"{\n  // font\n  \"editor.fontSize\": 14\n}")
            .unwrap();

        codec
            .upsert(&mut doc, "git", &ServerSpec::stdio("uvx", vec!["mcp-git".into()]))
            .unwrap();

        assert_eq!(
            Value::Object(doc),
            json!({
                "editor.fontSize": 14,
                "mcp": {"servers": {"git": {"command": "uvx", "args": ["mcp-git"], "env": {}}}}
            })
        );
    }

    #[test]
    fn keeps_other_mcp_settings() {
        let codec = VsCodeCodec::default();
        let mut doc = codec
            .parse(br#"{"mcp": {"inputs": [], "servers": {"old": {}}}}"#)
            .unwrap();

        let removed = codec
            .prune(&mut doc, &BTreeSet::from(["new".to_string()]))
            .unwrap();

        assert_eq!(removed, vec!["old".to_string()]);
        assert_eq!(Value::Object(doc), json!({"mcp": {"inputs": [], "servers": {}}}));
    }

    #[test]
    fn override_key_is_a_literal_top_level_key() {
        let codec = VsCodeCodec::new(Some("openctx.providers".to_string()));
        let mut doc = Document::new();

        codec
            .upsert(&mut doc, "remote", &ServerSpec::remote("https://mcp.example.com"))
            .unwrap();

        assert_eq!(
            Value::Object(doc),
            json!({"openctx.providers": {"remote": {"url": "https://mcp.example.com"}}})
        );
    }

    #[test]
    fn scalar_mcp_node_fails_closed() {
        let codec = VsCodeCodec::default();
        let mut doc = codec.parse(br#"{"mcp": true}"#).unwrap();
        let err = codec
            .upsert(&mut doc, "a", &ServerSpec::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "expected 'mcp' to be an object");
    }
}
