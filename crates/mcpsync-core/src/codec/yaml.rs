//! YAML document with a root `mcpServers` map.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::mcp::ServerSpec;
use crate::types::DocumentFormat;

use super::{Codec, CodecError, Document, tree};

const SYNTAX: &str = "YAML";
const SERVERS_PATH: &[&str] = &["mcpServers"];

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Yaml
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| CodecError::Parse {
            syntax: SYNTAX,
            message: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(Document::new());
        }

        let value: Value = serde_yaml::from_str(text).map_err(|e| CodecError::Parse {
            syntax: SYNTAX,
            message: e.to_string(),
        })?;
        match value {
            Value::Null => Ok(Document::new()),
            Value::Object(map) => Ok(map),
            _ => Err(CodecError::Parse {
                syntax: SYNTAX,
                message: "expected a mapping at the document root".to_string(),
            }),
        }
    }

    fn upsert(&self, doc: &mut Document, id: &str, spec: &ServerSpec) -> Result<(), CodecError> {
        tree::upsert_at(doc, SERVERS_PATH, id, tree::render_entry(spec, false))
    }

    fn prune(
        &self,
        doc: &mut Document,
        live: &BTreeSet<String>,
    ) -> Result<Vec<String>, CodecError> {
        tree::prune_at(doc, SERVERS_PATH, live)
    }

    fn serialize(&self, doc: &Document) -> Result<Vec<u8>, CodecError> {
        serde_yaml::to_string(doc)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Serialize {
                syntax: SYNTAX,
                message: e.to_string(),
            })
    }
}
