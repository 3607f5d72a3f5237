//! TOML document with a root `mcpServers` table.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::mcp::ServerSpec;
use crate::types::DocumentFormat;

use super::{Codec, CodecError, Document, tree};

const SYNTAX: &str = "TOML";
const SERVERS_PATH: &[&str] = &["mcpServers"];

#[derive(Debug, Default, Clone, Copy)]
pub struct TomlCodec;

impl Codec for TomlCodec {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Toml
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| CodecError::Parse {
            syntax: SYNTAX,
            message: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(Document::new());
        }

        let table: toml::Table = toml::from_str(text).map_err(|e| CodecError::Parse {
            syntax: SYNTAX,
            message: e.to_string(),
        })?;
        Ok(toml_table_to_json(table))
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
        let table = json_map_to_toml(doc)?;
        toml::to_string_pretty(&table)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Serialize {
                syntax: SYNTAX,
                message: e.to_string(),
            })
    }
}

fn toml_table_to_json(table: toml::Table) -> Map<String, Value> {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json_value(value)))
        .collect()
}

fn toml_to_json_value(toml_value: toml::Value) -> Value {
    match toml_value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => {
            // serde_json::Number doesn't support NaN/Infinity, fall back to string
            serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string()))
        }
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json_value).collect()),
        toml::Value::Table(table) => Value::Object(toml_table_to_json(table)),
    }
}

fn json_map_to_toml(map: &Map<String, Value>) -> Result<toml::Table, CodecError> {
    let mut table = toml::Table::new();
    for (key, value) in map {
        // TOML has no null
        if let Some(converted) = json_to_toml_value(value)? {
            table.insert(key.clone(), converted);
        }
    }
    Ok(table)
}

fn json_to_toml_value(json_value: &Value) -> Result<Option<toml::Value>, CodecError> {
    let converted = match json_value {
        Value::Null => return Ok(None),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                toml::Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                toml::Value::Float(f)
            } else {
                return Err(CodecError::Serialize {
                    syntax: SYNTAX,
                    message: format!("unsupported number {}", n),
                });
            }
        }
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Array(arr) => {
            let mut items = Vec::with_capacity(arr.len());
            for item in arr {
                if let Some(converted) = json_to_toml_value(item)? {
                    items.push(converted);
                }
            }
            toml::Value::Array(items)
        }
        Value::Object(obj) => toml::Value::Table(json_map_to_toml(obj)?),
    };
    Ok(Some(converted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upserts_into_existing_toml() {
        let codec = TomlCodec;
        let mut doc = codec
            .parse(b"active_model = \"devstral\"\n\n[mcpServers.old]\ncommand = \"old\"\n")
            .unwrap();

        codec
            .upsert(
                &mut doc,
                "remote",
                &ServerSpec::remote("https://mcp.example.com").with_env("TOKEN", "t"),
            )
            .unwrap();

        let out = String::from_utf8(codec.serialize(&doc).unwrap()).unwrap();
        assert!(out.contains("active_model = \"devstral\""));
        assert!(out.contains("[mcpServers.remote]"));

        let reparsed = codec.parse(out.as_bytes()).unwrap();
        assert_eq!(
            reparsed["mcpServers"]["remote"],
            json!({"env": {"TOKEN": "t"}, "url": "https://mcp.example.com"})
        );
        assert_eq!(reparsed["mcpServers"]["old"], json!({"command": "old"}));
    }

    #[test]
    fn nulls_are_dropped_on_output() {
        let mut doc = Document::new();
        doc.insert("gone".to_string(), Value::Null);
        doc.insert("list".to_string(), json!([1, null, 2]));

        let out = String::from_utf8(TomlCodec.serialize(&doc).unwrap()).unwrap();
        assert!(!out.contains("gone"));
        assert_eq!(
            Value::Object(TomlCodec.parse(out.as_bytes()).unwrap()),
            json!({"list": [1, 2]})
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = TomlCodec.parse(b"[mcpServers\ncommand = 1").unwrap_err();
        assert!(matches!(err, CodecError::Parse { syntax: "TOML", .. }));
    }
}
