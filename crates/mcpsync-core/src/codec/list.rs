//! Continue-style list of `{ name, transport }` records under `experimental`.

use std::collections::BTreeSet;

use serde_json::{Map, Value, json};

use crate::mcp::ServerSpec;
use crate::types::DocumentFormat;

use super::{Codec, CodecError, Document, json, tree};

const PARENT_KEY: &str = "experimental";
const DEFAULT_LIST_KEY: &str = "modelContextProtocolServers";

#[derive(Debug, Clone)]
pub struct ContinueCodec {
    list_key: String,
}

impl Default for ContinueCodec {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ContinueCodec {
    pub fn new(list_key: Option<String>) -> Self {
        Self {
            list_key: list_key.unwrap_or_else(|| DEFAULT_LIST_KEY.to_string()),
        }
    }

    fn list_path(&self) -> String {
        format!("{}.{}", PARENT_KEY, self.list_key)
    }

    fn list_mut<'a>(&self, parent: &'a mut Map<String, Value>) -> Result<&'a mut Vec<Value>, CodecError> {
        let slot = parent.entry(self.list_key.clone()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(list) => Ok(list),
            _ => Err(CodecError::Shape {
                path: self.list_path(),
                expected: "a list",
            }),
        }
    }
}

/// A server with a URL becomes a remote transport, anything else a local one.
fn render_record(id: &str, spec: &ServerSpec) -> Value {
    let transport = match spec.url() {
        Some(url) => json!({"type": "remote", "url": url}),
        None => json!({
            "type": "local",
            "command": spec.command().unwrap_or_default(),
            "args": tree::string_list(&spec.args),
            "env": Value::Object(tree::env_map(spec)),
        }),
    };
    json!({"name": id, "transport": transport})
}

fn record_name(record: &Value) -> Option<&str> {
    record.get("name").and_then(Value::as_str)
}

impl Codec for ContinueCodec {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Continue
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        json::parse_jsonc(bytes)
    }

    fn upsert(&self, doc: &mut Document, id: &str, spec: &ServerSpec) -> Result<(), CodecError> {
        let parent = tree::descend_mut(doc, &[PARENT_KEY])?;
        let list = self.list_mut(parent)?;
        let record = render_record(id, spec);

        match list.iter_mut().find(|r| record_name(r) == Some(id)) {
            Some(existing) => *existing = record,
            None => list.push(record),
        }
        Ok(())
    }

    fn prune(
        &self,
        doc: &mut Document,
        live: &BTreeSet<String>,
    ) -> Result<Vec<String>, CodecError> {
        let Some(parent) = tree::lookup_mut(doc, &[PARENT_KEY])? else {
            return Ok(Vec::new());
        };
        let list = match parent.get_mut(&self.list_key) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(list)) => list,
            Some(_) => {
                return Err(CodecError::Shape {
                    path: self.list_path(),
                    expected: "a list",
                });
            }
        };

        let mut removed = Vec::new();
        list.retain(|record| match record_name(record) {
            Some(name) if !live.contains(name) => {
                removed.push(name.to_string());
                false
            }
            // records without a name are not ours to judge
            _ => true,
        });
        Ok(removed)
    }

    fn serialize(&self, doc: &Document) -> Result<Vec<u8>, CodecError> {
        json::to_pretty_json(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn appends_local_and_remote_records() {
        let codec = ContinueCodec::default();
        let mut doc = codec.parse(br#"{"models": []}"#).unwrap();

        codec
            .upsert(
                &mut doc,
                "fs",
                &ServerSpec::stdio("npx", vec!["fs-server".into()]).with_env("ROOT", "/tmp"),
            )
            .unwrap();
        codec
            .upsert(&mut doc, "web", &ServerSpec::remote("https://mcp.example.com/sse"))
            .unwrap();

        assert_eq!(
            Value::Object(doc),
            json!({
                "models": [],
                "experimental": {"modelContextProtocolServers": [
                    {"name": "fs", "transport": {"type": "local", "command": "npx", "args": ["fs-server"], "env": {"ROOT": "/tmp"}}},
                    {"name": "web", "transport": {"type": "remote", "url": "https://mcp.example.com/sse"}}
                ]}
            })
        );
    }

    #[test]
    fn replaces_matching_record_in_place() {
        let codec = ContinueCodec::default();
        let mut doc = codec
            .parse(
                br#"{"experimental": {"modelContextProtocolServers": [
                    {"name": "a", "transport": {"type": "local", "command": "old"}},
                    {"name": "b", "transport": {"type": "local", "command": "b"}}
                ]}}"#,
            )
            .unwrap();

        codec
            .upsert(&mut doc, "a", &ServerSpec::remote("https://new.test"))
            .unwrap();

        let list = doc["experimental"]["modelContextProtocolServers"]
            .as_array()
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"], json!("a"));
        assert_eq!(list[0]["transport"]["url"], json!("https://new.test"));
        assert_eq!(list[1]["name"], json!("b"));
    }

    #[test]
    fn url_wins_over_command() {
        let spec = ServerSpec {
            command: Some("npx".into()),
            url: Some("https://both.test".into()),
            ..ServerSpec::default()
        };
        let record = render_record("both", &spec);
        assert_eq!(record["transport"]["type"], json!("remote"));
    }

    #[test]
    fn prune_removes_stale_records_and_keeps_foreign_items() {
        let codec = ContinueCodec::default();
        let mut doc = codec
            .parse(
                br#"{"experimental": {"modelContextProtocolServers": [
                    "not-a-record",
                    {"name": "keep"},
                    {"name": "stale"},
                    {"transport": {}}
                ]}}"#,
            )
            .unwrap();

        let removed = codec.prune(&mut doc, &live(&["keep"])).unwrap();
        assert_eq!(removed, vec!["stale".to_string()]);
        assert_eq!(
            doc["experimental"]["modelContextProtocolServers"],
            json!(["not-a-record", {"name": "keep"}, {"transport": {}}])
        );
    }

    #[test]
    fn list_key_override() {
        let codec = ContinueCodec::new(Some("mcpServers".to_string()));
        let mut doc = Document::new();
        codec
            .upsert(&mut doc, "a", &ServerSpec::stdio("x", vec![]))
            .unwrap();
        assert!(doc["experimental"]["mcpServers"].is_array());
    }

    #[test]
    fn object_in_place_of_list_fails_closed() {
        let codec = ContinueCodec::default();
        let mut doc = codec
            .parse(br#"{"experimental": {"modelContextProtocolServers": {}}}"#)
            .unwrap();

        let err = codec
            .upsert(&mut doc, "a", &ServerSpec::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected 'experimental.modelContextProtocolServers' to be a list"
        );
        assert!(codec.prune(&mut doc, &live(&[])).is_err());
    }
}
