//! Filesystem primitives shared across features.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const MAX_LINK_HOPS: usize = 40;

/// Write `bytes` to `path` so readers see either the old or the new content.
///
/// The payload goes to a temporary file next to the real destination which
/// is then renamed over it. A symlinked destination is written through, so
/// the link keeps pointing at the same file, and an existing file keeps its
/// permissions. Parent directories are created as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let target = resolve_destination(path)?;
    let permissions = match std::fs::metadata(&target) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => return Err(err),
    };

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let result = (|| {
        let mut file = std::fs::File::create(&tmp_path)?;
        if let Some(permissions) = permissions {
            file.set_permissions(permissions)?;
        }
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp_path, &target)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

/// The file a write to `path` should land in.
///
/// Symlinks are followed, including a dangling one whose target does not
/// exist yet. A path that does not exist is returned unchanged.
fn resolve_destination(path: &Path) -> std::io::Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(real) => return Ok(real),
        Err(err) if err.kind() != ErrorKind::NotFound => return Err(err),
        Err(_) => {}
    }

    let mut current = path.to_path_buf();
    // bounded so a symlink loop cannot spin forever
    for _ in 0..MAX_LINK_HOPS {
        match std::fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let link = std::fs::read_link(&current)?;
                current = match current.parent() {
                    Some(parent) if link.is_relative() => parent.join(link),
                    _ => link,
                };
            }
            _ => return Ok(current),
        }
    }
    Err(std::io::Error::other(format!(
        "too many levels of symbolic links: {}",
        path.display()
    )))
}

/// Copy a file, creating the destination's parent directories first.
pub fn copy_file(from: &Path, to: &Path) -> std::io::Result<u64> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(from, to)
}

/// Create a directory tree with owner+group permissions (0750) where supported.
pub fn create_private_dir(path: &Path) -> std::io::Result<()> {
    private_dir_builder(true).create(path)
}

/// Create one private directory, failing with `AlreadyExists` if it is there.
///
/// The parent must already exist.
pub fn create_new_private_dir(path: &Path) -> std::io::Result<()> {
    private_dir_builder(false).create(path)
}

fn private_dir_builder(recursive: bool) -> std::fs::DirBuilder {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder
}
