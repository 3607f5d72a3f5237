//! Root-level `mcpServers` map in a JSON document.

use std::collections::BTreeSet;

use crate::mcp::ServerSpec;
use crate::types::DocumentFormat;

use super::{Codec, CodecError, Document, json, tree};

const SERVERS_PATH: &[&str] = &["mcpServers"];

/// Codec for `claude-desktop` and its `simple-json` alias.
#[derive(Debug, Clone, Copy)]
pub struct FlatJsonCodec {
    format: DocumentFormat,
}

impl FlatJsonCodec {
    pub fn new(format: DocumentFormat) -> Self {
        Self { format }
    }
}

impl Codec for FlatJsonCodec {
    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        json::parse_jsonc(bytes)
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
        json::to_pretty_json(doc)
    }
}
