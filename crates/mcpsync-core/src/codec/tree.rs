//! Helpers for walking and editing the managed collection node.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::mcp::ServerSpec;

use super::{CodecError, Document};

/// Walk `path`, creating missing (or null) objects along the way.
///
/// A node that exists with any other type is never replaced.
pub(crate) fn descend_mut<'a>(
    root: &'a mut Document,
    path: &[&str],
) -> Result<&'a mut Document, CodecError> {
    let mut current = root;
    for (idx, segment) in path.iter().enumerate() {
        let slot = current.entry(segment.to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return Err(shape_error(&path[..=idx], "an object")),
        };
    }
    Ok(current)
}

/// Walk `path` without creating anything. `None` when any segment is absent.
pub(crate) fn lookup_mut<'a>(
    root: &'a mut Document,
    path: &[&str],
) -> Result<Option<&'a mut Document>, CodecError> {
    let mut current = root;
    for (idx, segment) in path.iter().enumerate() {
        current = match current.get_mut(*segment) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(shape_error(&path[..=idx], "an object")),
        };
    }
    Ok(Some(current))
}

pub(crate) fn shape_error(path: &[&str], expected: &'static str) -> CodecError {
    CodecError::Shape {
        path: path.join("."),
        expected,
    }
}

/// Render a server as a client map entry.
///
/// Empty optional fields are omitted. `force_env` emits `env: {}` even when
/// the server has no environment.
pub(crate) fn render_entry(spec: &ServerSpec, force_env: bool) -> Value {
    let mut entry = Map::new();
    if let Some(command) = spec.command() {
        entry.insert("command".to_string(), Value::String(command.to_string()));
    }
    if !spec.args.is_empty() {
        entry.insert("args".to_string(), string_list(&spec.args));
    }
    if force_env || !spec.env.is_empty() {
        entry.insert("env".to_string(), Value::Object(env_map(spec)));
    }
    if let Some(url) = spec.url() {
        entry.insert("url".to_string(), Value::String(url.to_string()));
    }
    if spec.disabled {
        entry.insert("disabled".to_string(), Value::Bool(true));
    }
    if !spec.auto_approve.is_empty() {
        entry.insert("autoApprove".to_string(), string_list(&spec.auto_approve));
    }
    Value::Object(entry)
}

pub(crate) fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

pub(crate) fn env_map(spec: &ServerSpec) -> Map<String, Value> {
    spec.env
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Drop keys not in `live`, keeping the order of the survivors.
pub(crate) fn prune_map(map: &mut Map<String, Value>, live: &BTreeSet<String>) -> Vec<String> {
    let removed: Vec<String> = map.keys().filter(|k| !live.contains(*k)).cloned().collect();
    if !removed.is_empty() {
        map.retain(|k, _| live.contains(k));
    }
    removed
}

/// Upsert into a map-shaped managed node at `path`.
pub(crate) fn upsert_at(
    doc: &mut Document,
    path: &[&str],
    id: &str,
    entry: Value,
) -> Result<(), CodecError> {
    let node = descend_mut(doc, path)?;
    node.insert(id.to_string(), entry);
    Ok(())
}

/// Prune a map-shaped managed node at `path`. A missing node prunes nothing.
pub(crate) fn prune_at(
    doc: &mut Document,
    path: &[&str],
    live: &BTreeSet<String>,
) -> Result<Vec<String>, CodecError> {
    match lookup_mut(doc, path)? {
        Some(node) => Ok(prune_map(node, live)),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn descend_creates_missing_and_null_nodes() {
        let mut root = doc(json!({"mcp": null}));
        descend_mut(&mut root, &["mcp", "servers"]).unwrap();
        assert_eq!(Value::Object(root), json!({"mcp": {"servers": {}}}));
    }

    #[test]
    fn descend_refuses_to_replace_wrong_type() {
        let mut root = doc(json!({"mcp": {"servers": []}}));
        let err = descend_mut(&mut root, &["mcp", "servers"]).unwrap_err();
        assert!(matches!(err, CodecError::Shape { ref path, .. } if path == "mcp.servers"));
    }

    #[test]
    fn lookup_does_not_create() {
        let mut root = Document::new();
        assert!(lookup_mut(&mut root, &["mcpServers"]).unwrap().is_none());
        assert!(root.is_empty());
    }

    #[test]
    fn render_entry_orders_fields_and_skips_empties() {
        let spec = ServerSpec {
            command: Some("npx".into()),
            args: vec!["-y".into()],
            url: Some(String::new()),
            disabled: true,
            auto_approve: vec!["read".into()],
            ..ServerSpec::default()
        }
        .with_env("A", "1");

        let rendered = serde_json::to_string(&render_entry(&spec, false)).unwrap();
        assert_eq!(
            rendered,
            r#"{"command":"npx","args":["-y"],"env":{"A":"1"},"disabled":true,"autoApprove":["read"]}"#
        );
    }

    #[test]
    fn render_entry_forces_env_when_asked() {
        let spec = ServerSpec::stdio("echo", vec![]);
        assert_eq!(
            render_entry(&spec, true),
            json!({"command": "echo", "env": {}})
        );
    }

    #[test]
    fn prune_map_keeps_survivor_order() {
        let mut map = doc(json!({"c": 1, "stale": 2, "a": 3}));
        let live: BTreeSet<String> = ["a", "c"].iter().map(|s| s.to_string()).collect();

        let removed = prune_map(&mut map, &live);
        assert_eq!(removed, vec!["stale".to_string()]);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["c", "a"]);
    }
}
