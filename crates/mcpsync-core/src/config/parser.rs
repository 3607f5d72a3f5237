//! TOML parser with helpful error messages

use super::schema::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse config.toml with detailed error messages
pub fn parse_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse config.toml content from string
pub fn parse_config_str(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content).map_err(|e| describe_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Turn a TOML error into one that names the line and the table it sits in.
fn describe_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().trim_end().to_string();
    let Some(span) = error.span() else {
        return anyhow::anyhow!("TOML parsing error: {}", message);
    };

    let before = content.get(..span.start).unwrap_or(content);
    let line_num = before.matches('\n').count() + 1;
    let lines: Vec<&str> = content.lines().collect();

    let table = enclosing_table(&lines, line_num);
    let location = match table {
        Some(table) => format!("line {} in [{}]", line_num, table),
        None => format!("line {}", line_num),
    };
    let hint = match table {
        Some(table) if table.starts_with("clients.") => {
            "\nHint: a client takes config_path, and optionally format and key"
        }
        Some("backups") => "\nHint: [backups] takes path and retention",
        _ => "",
    };

    anyhow::anyhow!(
        "TOML parsing error at {}:\n{}\n\nError: {}{}",
        location,
        excerpt(&lines, line_num),
        message,
        hint
    )
}

/// Header of the table that owns `line_num`, e.g. `clients.cursor`.
///
/// `None` when the line is itself a header or precedes every table.
fn enclosing_table<'a>(lines: &[&'a str], line_num: usize) -> Option<&'a str> {
    let current = lines.get(line_num.checked_sub(1)?)?.trim_start();
    if current.starts_with('[') {
        return None;
    }
    lines[..line_num - 1].iter().rev().find_map(|line| {
        let line = line.trim();
        line.strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .map(|name| name.trim_matches(['[', ']']).trim())
    })
}

/// The offending line with one line of context on each side.
fn excerpt(lines: &[&str], line_num: usize) -> String {
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());
    if start >= end {
        return String::new();
    }

    (start..end)
        .map(|idx| {
            let marker = if idx + 1 == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, idx + 1, lines[idx])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).with_context(|| "Failed to serialize configuration to TOML")
}
