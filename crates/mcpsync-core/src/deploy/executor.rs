//! Execute the apply sequence for a single client file.

use std::io;
use std::path::Path;

use crate::backup::BackupStore;
use crate::codec::{self, Codec, CodecError, Document};
use crate::config::{CanonicalConfig, ClientTarget};
use crate::fs::write_atomic;

use super::{ApplyError, ApplyResult, Step};

/// Applies one canonical set, backing files up into one backup store.
#[derive(Debug, Clone, Copy)]
pub struct Deployer<'a> {
    pub(crate) canonical: &'a CanonicalConfig,
    pub(crate) backups: &'a BackupStore,
    pub(crate) retention: usize,
}

impl<'a> Deployer<'a> {
    pub fn new(canonical: &'a CanonicalConfig, backups: &'a BackupStore) -> Self {
        Self {
            canonical,
            backups,
            retention: 0,
        }
    }

    /// Keep at most `keep` backups per client after each snapshot. 0 keeps all.
    pub fn with_retention(mut self, keep: usize) -> Self {
        self.retention = keep;
        self
    }

    /// Run `backup -> apply servers -> prune` for one client.
    ///
    /// Never panics on client-local problems; failures end up in
    /// [`ApplyResult::error`].
    pub fn apply_client(&self, name: &str, target: &ClientTarget) -> ApplyResult {
        let mut result = ApplyResult::new(name);
        match self.run(name, target, &mut result) {
            Ok(()) => result.success = true,
            Err(err) => {
                tracing::warn!(client = name, error = %err, "Apply failed");
                result.error = Some(err);
            }
        }
        result
    }

    fn run(
        &self,
        name: &str,
        target: &ClientTarget,
        result: &mut ApplyResult,
    ) -> Result<(), ApplyError> {
        let path = target
            .resolve_path()
            .map_err(|e| ApplyError::PathResolution {
                reason: format!("{:#}", e),
            })?;
        result.path = Some(path.clone());

        let format = target
            .resolve_format(name, &path)
            .ok_or_else(|| ApplyError::UnknownFormat { path: path.clone() })?;
        let codec = codec::codec_for(format, target.key.as_deref());
        tracing::debug!(client = name, path = %path.display(), %format, "Applying client");

        if let Some(record) = self.backups.snapshot(name, &path)? {
            result.backup_path = Some(record.path);
            if self.retention > 0
                && let Err(err) = self.backups.enforce_retention(name, self.retention)
            {
                tracing::warn!(client = name, error = %err, "Backup retention failed");
            }
        }

        for (id, spec) in &self.canonical.mcp_servers {
            let step = Step::Server(id.clone());
            let written = rewrite(codec.as_ref(), &path, &step, |doc| {
                codec.upsert(doc, id, spec).map(|()| true)
            })?;
            tracing::debug!(client = name, server = %id, written, "Applied server");
            result.applied.push(id.clone());
        }

        let live = self.canonical.server_names();
        let mut pruned = Vec::new();
        rewrite(codec.as_ref(), &path, &Step::Prune, |doc| {
            pruned = codec.prune(doc, &live)?;
            Ok(!pruned.is_empty())
        })?;
        if !pruned.is_empty() {
            tracing::info!(client = name, servers = ?pruned, "Removed obsolete servers");
        }
        result.pruned = pruned;

        Ok(())
    }
}

/// Read, parse, mutate and write back one client file.
///
/// The file is only written when `mutate` reports a change and the rendered
/// bytes differ from what is on disk. Returns whether a write happened.
fn rewrite(
    codec: &dyn Codec,
    path: &Path,
    step: &Step,
    mutate: impl FnOnce(&mut Document) -> Result<bool, CodecError>,
) -> Result<bool, ApplyError> {
    let original = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(source) => {
            return Err(ApplyError::Io {
                step: step.clone(),
                action: "read",
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut doc = codec
        .parse(&original)
        .map_err(|e| ApplyError::from_codec(step, path, e))?;
    let changed = mutate(&mut doc).map_err(|e| ApplyError::from_codec(step, path, e))?;
    if !changed {
        return Ok(false);
    }

    let rendered = codec
        .serialize(&doc)
        .map_err(|e| ApplyError::from_codec(step, path, e))?;
    if rendered == original {
        return Ok(false);
    }

    write_atomic(path, &rendered).map_err(|source| ApplyError::Io {
        step: step.clone(),
        action: "write",
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), %step, "Wrote client config");
    Ok(true)
}
