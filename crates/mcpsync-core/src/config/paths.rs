//! Config path resolution helpers.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Expand a leading `~` against the user's home directory and make the result
/// absolute against the current directory.
pub fn expand_path(raw: &str) -> anyhow::Result<PathBuf> {
    expand_path_with_home(raw, dirs::home_dir().as_deref())
}

pub fn expand_path_with_home(raw: &str, home: Option<&Path>) -> anyhow::Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        anyhow::bail!("Path is empty");
    }

    let expanded = if raw == "~" {
        home_or_err(home, raw)?.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        home_or_err(home, raw)?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if expanded.is_absolute() {
        return Ok(expanded);
    }
    std::path::absolute(&expanded)
        .with_context(|| format!("Failed to make path absolute: {}", expanded.display()))
}

fn home_or_err<'a>(home: Option<&'a Path>, raw: &str) -> anyhow::Result<&'a Path> {
    home.ok_or_else(|| anyhow::anyhow!("Could not determine home directory to expand '{}'", raw))
}

/// Physical identity of a file used to detect two clients sharing one file.
///
/// Symlinks are resolved when the file (or at least its parent) exists;
/// otherwise the absolute path is used as-is.
pub fn resolve_identity(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && let Ok(parent) = parent.canonicalize()
    {
        return parent.join(name);
    }
    path.to_path_buf()
}
