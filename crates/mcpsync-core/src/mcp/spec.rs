//! Canonical MCP server specification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One server of the canonical set.
///
/// The server's name is not part of the spec: it is the key of the canonical
/// map and is threaded alongside the spec wherever the spec travels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_approve: Vec<String>,
}

impl ServerSpec {
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args,
            ..Self::default()
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Command, treating an empty string as absent.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref().filter(|c| !c.is_empty())
    }

    /// URL, treating an empty string as absent.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// Problems worth surfacing to the user. Specs are never rejected for these.
    pub fn warnings(&self, name: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.command().is_none() && self.url().is_none() {
            warnings.push(format!(
                "Server '{}' has neither a command nor a url; clients will receive an incomplete entry",
                name
            ));
        }
        if let Some(raw) = self.url()
            && let Err(err) = url::Url::parse(raw)
        {
            warnings.push(format!("Server '{}' has an invalid url '{}': {}", name, raw, err));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_canonical_entry() {
        let spec: ServerSpec = serde_json::from_str(
            r#"{"command": "npx", "args": ["-y", "pkg"], "env": {"TOKEN": "x"}, "disabled": true, "autoApprove": ["read"]}"#,
        )
        .unwrap();

        assert_eq!(spec.command(), Some("npx"));
        assert_eq!(spec.args, vec!["-y", "pkg"]);
        assert_eq!(spec.env.get("TOKEN").map(String::as_str), Some("x"));
        assert!(spec.disabled);
        assert_eq!(spec.auto_approve, vec!["read"]);
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let spec = ServerSpec::stdio("echo", vec!["hi".to_string()]);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json, serde_json::json!({"command": "echo", "args": ["hi"]}));
    }

    #[test]
    fn warns_on_incomplete_spec() {
        let warnings = ServerSpec::default().warnings("empty");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("neither a command nor a url"));
    }

    #[test]
    fn warns_on_invalid_url() {
        let warnings = ServerSpec::remote("not a url").warnings("bad");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("invalid url"));

        assert!(
            ServerSpec::remote("https://mcp.example.com/sse")
                .warnings("ok")
                .is_empty()
        );
    }
}
