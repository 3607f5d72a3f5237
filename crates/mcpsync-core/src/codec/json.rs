//! JSON-with-comments reading and pretty JSON writing shared by the JSON codecs.

use serde_json::Value;

use super::{CodecError, Document};

const SYNTAX: &str = "JSON";

/// Parse JSON that may contain comments and trailing commas.
pub(crate) fn parse_jsonc(bytes: &[u8]) -> Result<Document, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|e| CodecError::Parse {
        syntax: SYNTAX,
        message: e.to_string(),
    })?;
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Ok(Document::new());
    }

    let value = jsonc_parser::parse_to_serde_value(text, &Default::default()).map_err(|e| {
        CodecError::Parse {
            syntax: SYNTAX,
            message: e.to_string(),
        }
    })?;

    match value {
        None | Some(Value::Null) => Ok(Document::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(CodecError::Parse {
            syntax: SYNTAX,
            message: "expected an object at the document root".to_string(),
        }),
    }
}

/// Two-space indented JSON with a trailing newline.
pub(crate) fn to_pretty_json(doc: &Document) -> Result<Vec<u8>, CodecError> {
    let mut bytes = serde_json::to_vec_pretty(doc).map_err(|e| CodecError::Serialize {
        syntax: SYNTAX,
        message: e.to_string(),
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}
