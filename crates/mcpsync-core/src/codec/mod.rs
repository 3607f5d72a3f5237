//! Client document codecs.
//!
//! Every supported document shape is handled by one [`Codec`] implementation.
//! All codecs normalize to `serde_json::Map<String, Value>` as the intermediate
//! representation, so the orchestrator never branches on the format: it parses,
//! upserts or prunes entries inside the managed collection node, and
//! serializes the whole document back.
//!
//! Codecs only touch the managed collection node. Sibling content survives the
//! round trip, modulo the key ordering and formatting applied by the
//! underlying serializer.

mod flat;
mod json;
mod list;
mod toml;
mod tree;
mod vscode;
mod yaml;

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::mcp::ServerSpec;
use crate::types::DocumentFormat;

pub use flat::FlatJsonCodec;
pub use list::ContinueCodec;
pub use toml::TomlCodec;
pub use vscode::VsCodeCodec;
pub use yaml::YamlCodec;

pub(crate) use json::parse_jsonc;

/// Format-neutral document tree.
pub type Document = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid {syntax}: {message}")]
    Parse {
        syntax: &'static str,
        message: String,
    },

    #[error("expected '{path}' to be {expected}")]
    Shape {
        path: String,
        expected: &'static str,
    },

    #[error("failed to serialize {syntax}: {message}")]
    Serialize {
        syntax: &'static str,
        message: String,
    },
}

/// Bidirectional mapping between canonical servers and one document shape.
pub trait Codec: Send + Sync {
    /// Format tag this codec handles.
    fn format(&self) -> DocumentFormat;

    /// Parse existing file bytes.
    ///
    /// Empty input yields an empty document. Anything else that fails to
    /// parse is an error, and callers must not write over the file.
    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError>;

    /// Insert or replace the entry for `id` in the managed collection node,
    /// creating the node if it is absent.
    fn upsert(&self, doc: &mut Document, id: &str, spec: &ServerSpec) -> Result<(), CodecError>;

    /// Remove every managed entry whose id is not in `live`.
    ///
    /// Returns the removed ids; an empty list means the document is unchanged.
    fn prune(&self, doc: &mut Document, live: &BTreeSet<String>)
    -> Result<Vec<String>, CodecError>;

    /// Render the document back to file bytes.
    fn serialize(&self, doc: &Document) -> Result<Vec<u8>, CodecError>;
}

/// Create the codec for a format, honoring an optional override key.
///
/// The override key only applies to the nested-map and list variants; the
/// root-keyed formats ignore it.
pub fn codec_for(format: DocumentFormat, key: Option<&str>) -> Box<dyn Codec> {
    let key = key.filter(|k| !k.is_empty()).map(str::to_string);
    match format {
        DocumentFormat::ClaudeDesktop | DocumentFormat::SimpleJson => {
            Box::new(FlatJsonCodec::new(format))
        }
        DocumentFormat::VsCode => Box::new(VsCodeCodec::new(key)),
        DocumentFormat::Continue => Box::new(ContinueCodec::new(key)),
        DocumentFormat::Yaml => Box::new(YamlCodec),
        DocumentFormat::Toml => Box::new(TomlCodec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn live(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn codec_for_returns_matching_format() {
        for format in DocumentFormat::ALL {
            assert_eq!(codec_for(format, None).format(), format);
        }
    }

    #[test]
    fn every_codec_parses_empty_input_to_empty_document() {
        for format in DocumentFormat::ALL {
            let codec = codec_for(format, None);
            assert!(codec.parse(b"").unwrap().is_empty(), "{format}");
            assert!(codec.parse(b"  \n").unwrap().is_empty(), "{format}");
        }
    }

    #[test]
    fn every_codec_converges_after_repeated_upserts() {
        let spec = ServerSpec::stdio("echo", vec!["hi".to_string()]);
        for format in DocumentFormat::ALL {
            let codec = codec_for(format, None);
            let mut doc = codec.parse(b"").unwrap();
            codec.upsert(&mut doc, "echo-server", &spec).unwrap();
            let first = codec.serialize(&doc).unwrap();

            let mut reparsed = codec.parse(&first).unwrap();
            codec.upsert(&mut reparsed, "echo-server", &spec).unwrap();
            let second = codec.serialize(&reparsed).unwrap();

            assert_eq!(first, second, "{format} output changed on second apply");
        }
    }

    #[test]
    fn every_codec_prunes_stale_entries() {
        for format in DocumentFormat::ALL {
            let codec = codec_for(format, None);
            let mut doc = Document::new();
            codec
                .upsert(&mut doc, "keep", &ServerSpec::stdio("a", vec![]))
                .unwrap();
            codec
                .upsert(&mut doc, "stale", &ServerSpec::remote("https://x.test"))
                .unwrap();

            let removed = codec.prune(&mut doc, &live(&["keep"])).unwrap();
            assert_eq!(removed, vec!["stale".to_string()], "{format}");

            let removed = codec.prune(&mut doc, &live(&["keep"])).unwrap();
            assert!(removed.is_empty(), "{format} pruned twice");
        }
    }

    #[test]
    fn key_override_is_ignored_by_root_keyed_formats() {
        let codec = codec_for(DocumentFormat::SimpleJson, Some("servers"));
        let mut doc = Document::new();
        codec
            .upsert(&mut doc, "a", &ServerSpec::stdio("x", vec![]))
            .unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({"mcpServers": {"a": {"command": "x"}}})
        );
    }
}
