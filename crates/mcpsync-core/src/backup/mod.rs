//! Timestamped snapshots of client configuration files.
//!
//! Backups live in one flat directory and are named
//! `<client>-<YYYYMMDD-HHMMSS><ext>`. Listing and restore parse that name
//! back, so the encoding must stay stable.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};

use crate::config::ClientTarget;
use crate::fs::{create_private_dir, write_atomic};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// `-` followed by the 15 character timestamp
const SUFFIX_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("'{}' is a directory, not a file", path.display())]
    SourceIsDirectory { path: PathBuf },

    #[error("no backups found for client '{client}'")]
    NotFound { client: String },

    #[error("backup '{file_name}' not found for client '{client}'")]
    FileNotFound { client: String, file_name: String },

    #[error("client '{client}' has backups but is not configured")]
    UnknownClient { client: String },

    #[error("invalid backup path '{}'", path.display())]
    InvalidPath { path: PathBuf },

    #[error("cannot resolve config path for client '{client}': {reason}")]
    PathResolution { client: String, reason: String },

    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        BackupError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub client: String,
    pub file_name: String,
    pub path: PathBuf,
    /// Source file extension including the dot, or empty
    pub extension: String,
    pub timestamp: NaiveDateTime,
}

/// Outcome of restoring every client at once.
#[derive(Debug, Default)]
pub struct RestoreSummary {
    pub restored: BTreeMap<String, BackupRecord>,
    pub errors: BTreeMap<String, BackupError>,
    /// Configured clients without any backup
    pub skipped: Vec<String>,
}

impl RestoreSummary {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
}

impl BackupStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `source` into the backup directory.
    ///
    /// Returns `Ok(None)` when the source does not exist yet: there is nothing
    /// to protect.
    pub fn snapshot(&self, client: &str, source: &Path) -> Result<Option<BackupRecord>, BackupError> {
        let now = Local::now().naive_local();
        self.snapshot_at(client, source, now.with_nanosecond(0).unwrap_or(now))
    }

    /// Like [`snapshot`](Self::snapshot) with an explicit timestamp.
    ///
    /// An existing backup is never overwritten: when the name is taken the
    /// timestamp moves forward one second at a time until it is free.
    pub fn snapshot_at(
        &self,
        client: &str,
        source: &Path,
        timestamp: NaiveDateTime,
    ) -> Result<Option<BackupRecord>, BackupError> {
        let metadata = match std::fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(client, path = %source.display(), "Nothing to back up");
                return Ok(None);
            }
            Err(err) => return Err(BackupError::io("inspect", source, err)),
        };
        if metadata.is_dir() {
            return Err(BackupError::SourceIsDirectory {
                path: source.to_path_buf(),
            });
        }

        create_private_dir(&self.root).map_err(|e| BackupError::io("create", &self.root, e))?;

        let extension = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut reader =
            std::fs::File::open(source).map_err(|e| BackupError::io("open", source, e))?;
        let mut timestamp = timestamp;
        let (file_name, path, mut file) = loop {
            let file_name = backup_file_name(client, timestamp, &extension);
            let path = self.root.join(&file_name);
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => break (file_name, path, file),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    timestamp += TimeDelta::seconds(1);
                }
                Err(err) => return Err(BackupError::io("create", &path, err)),
            }
        };

        if let Err(err) = io::copy(&mut reader, &mut file) {
            let _ = std::fs::remove_file(&path);
            return Err(BackupError::io("copy into", &path, err));
        }
        // a backup is no more readable than the file it protects
        #[cfg(unix)]
        file.set_permissions(metadata.permissions())
            .map_err(|e| BackupError::io("set permissions on", &path, e))?;

        tracing::info!(client, from = %source.display(), to = %path.display(), "Backed up client config");
        Ok(Some(BackupRecord {
            client: client.to_string(),
            file_name,
            path,
            extension,
            timestamp,
        }))
    }

    /// All backups grouped by client, newest first.
    pub fn list(&self) -> Result<BTreeMap<String, Vec<BackupRecord>>, BackupError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(BackupError::io("read", &self.root, err)),
        };

        let mut grouped: BTreeMap<String, Vec<BackupRecord>> = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| BackupError::io("read", &self.root, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(record) = read_record(path, file_name) {
                grouped.entry(record.client.clone()).or_default().push(record);
            }
        }

        for records in grouped.values_mut() {
            records.sort_by(|a, b| {
                b.timestamp
                    .cmp(&a.timestamp)
                    .then_with(|| b.file_name.cmp(&a.file_name))
            });
        }
        Ok(grouped)
    }

    pub fn latest(&self, client: &str) -> Result<BackupRecord, BackupError> {
        self.list()?
            .remove(client)
            .and_then(|records| records.into_iter().next())
            .ok_or_else(|| BackupError::NotFound {
                client: client.to_string(),
            })
    }

    /// Copy the newest backup of `client` back over `target`.
    pub fn restore_latest(&self, client: &str, target: &Path) -> Result<BackupRecord, BackupError> {
        let record = self.latest(client)?;
        self.copy_back(&record, target)?;
        Ok(record)
    }

    /// Copy one specific backup of `client` back over `target`.
    pub fn restore_file(
        &self,
        client: &str,
        file_name: &str,
        target: &Path,
    ) -> Result<BackupRecord, BackupError> {
        let record = self.find(client, file_name)?;
        self.copy_back(&record, target)?;
        Ok(record)
    }

    /// Restore the newest backup of every client that has one.
    ///
    /// One client's failure never stops the others.
    pub fn restore_all(
        &self,
        targets: &BTreeMap<String, ClientTarget>,
    ) -> Result<RestoreSummary, BackupError> {
        let backups = self.list()?;
        let mut summary = RestoreSummary::default();

        for (client, records) in backups {
            let Some(record) = records.into_iter().next() else {
                continue;
            };
            let outcome = match targets.get(&client) {
                None => Err(BackupError::UnknownClient {
                    client: client.clone(),
                }),
                Some(target) => target
                    .resolve_path()
                    .map_err(|e| BackupError::PathResolution {
                        client: client.clone(),
                        reason: format!("{:#}", e),
                    })
                    .and_then(|path| self.copy_back(&record, &path)),
            };
            match outcome {
                Ok(()) => {
                    summary.restored.insert(client, record);
                }
                Err(err) => {
                    tracing::warn!(client = %client, error = %err, "Restore failed");
                    summary.errors.insert(client, err);
                }
            }
        }

        summary.skipped = targets
            .keys()
            .filter(|name| {
                !summary.restored.contains_key(*name) && !summary.errors.contains_key(*name)
            })
            .cloned()
            .collect();
        Ok(summary)
    }

    /// Remove one backup file of `client`.
    pub fn delete(&self, client: &str, file_name: &str) -> Result<BackupRecord, BackupError> {
        let record = self.find(client, file_name)?;
        std::fs::remove_file(&record.path).map_err(|e| BackupError::io("delete", &record.path, e))?;
        tracing::info!(client, path = %record.path.display(), "Deleted backup");
        Ok(record)
    }

    /// Keep only the newest `keep` backups of `client`. `keep == 0` keeps all.
    pub fn enforce_retention(&self, client: &str, keep: usize) -> Result<Vec<BackupRecord>, BackupError> {
        if keep == 0 {
            return Ok(Vec::new());
        }
        let records = self.list()?.remove(client).unwrap_or_default();

        let mut removed = Vec::new();
        for record in records.into_iter().skip(keep) {
            std::fs::remove_file(&record.path)
                .map_err(|e| BackupError::io("delete", &record.path, e))?;
            tracing::debug!(client, path = %record.path.display(), "Pruned old backup");
            removed.push(record);
        }
        Ok(removed)
    }

    /// Resolve a backup by name, refusing anything outside the backup root.
    fn find(&self, client: &str, file_name: &str) -> Result<BackupRecord, BackupError> {
        let path = self.root.join(file_name);
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || path.parent() != Some(self.root.as_path())
        {
            return Err(BackupError::InvalidPath { path });
        }

        let not_found = || BackupError::FileNotFound {
            client: client.to_string(),
            file_name: file_name.to_string(),
        };
        if !path.is_file() {
            return Err(not_found());
        }
        match read_record(path, file_name.to_string()) {
            Some(record) if record.client == client => Ok(record),
            _ => Err(not_found()),
        }
    }

    fn copy_back(&self, record: &BackupRecord, target: &Path) -> Result<(), BackupError> {
        let bytes =
            std::fs::read(&record.path).map_err(|e| BackupError::io("read", &record.path, e))?;
        write_atomic(target, &bytes).map_err(|e| BackupError::io("restore", target, e))?;
        tracing::info!(
            client = %record.client,
            from = %record.path.display(),
            to = %target.display(),
            "Restored client config"
        );
        Ok(())
    }
}

pub fn backup_file_name(client: &str, timestamp: NaiveDateTime, extension: &str) -> String {
    format!("{}-{}{}", client, timestamp.format(TIMESTAMP_FORMAT), extension)
}

/// Split `<client>-<timestamp><ext>` into its parts.
fn split_backup_name(file_name: &str) -> Option<(&str, &str, &str)> {
    let ext_len = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.len() + 1)
        .unwrap_or(0);
    let stem = &file_name[..file_name.len() - ext_len];
    if stem.len() <= SUFFIX_LEN {
        return None;
    }
    let split = stem.len() - SUFFIX_LEN;
    if !stem.is_char_boundary(split) || stem.as_bytes()[split] != b'-' {
        return None;
    }
    Some((&stem[..split], &stem[split + 1..], &file_name[stem.len()..]))
}

/// Build a record from a backup file, falling back to the file's mtime when
/// the embedded timestamp does not parse.
fn read_record(path: PathBuf, file_name: String) -> Option<BackupRecord> {
    let (client, stamp, extension) = split_backup_name(&file_name)?;
    let timestamp = match NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) {
        Ok(timestamp) => timestamp,
        Err(_) => {
            let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            chrono::DateTime::<Local>::from(modified).naive_local()
        }
    };
    Some(BackupRecord {
        client: client.to_string(),
        extension: extension.to_string(),
        file_name: file_name.clone(),
        path,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn splits_backup_names() {
        assert_eq!(
            split_backup_name("claude-desktop-20250102-030405.json"),
            Some(("claude-desktop", "20250102-030405", ".json"))
        );
        assert_eq!(
            split_backup_name("warp-20250102-030405"),
            Some(("warp", "20250102-030405", ""))
        );
        assert_eq!(split_backup_name("-20250102-030405.json"), None);
        assert_eq!(split_backup_name("short.json"), None);
        assert_eq!(split_backup_name("cursor_20250102_030405x.json"), None);
    }

    #[test]
    fn missing_source_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let store = BackupStore::new(temp.path().join("backups"));
        let record = store
            .snapshot("cursor", &temp.path().join("missing.json"))
            .unwrap();
        assert!(record.is_none());
        assert!(!store.root().exists());
    }

    #[test]
    fn directory_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = BackupStore::new(temp.path().join("backups"));
        let err = store.snapshot("cursor", temp.path()).unwrap_err();
        assert!(matches!(err, BackupError::SourceIsDirectory { .. }));
    }

    #[test]
    fn same_second_snapshots_do_not_collide() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("mcp.json");
        std::fs::write(&source, "{}").unwrap();
        let store = BackupStore::new(temp.path().join("backups"));

        let at = ts("20250102-030405");
        let first = store.snapshot_at("cursor", &source, at).unwrap().unwrap();
        let second = store.snapshot_at("cursor", &source, at).unwrap().unwrap();

        assert_eq!(first.file_name, "cursor-20250102-030405.json");
        assert_eq!(second.file_name, "cursor-20250102-030406.json");

        let listed = store.list().unwrap();
        let names: Vec<_> = listed["cursor"].iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["cursor-20250102-030406.json", "cursor-20250102-030405.json"]);
    }

    #[test]
    fn list_skips_directories_and_short_names() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("backups");
        std::fs::create_dir_all(root.join("sync-20250102-030405")).unwrap();
        std::fs::write(root.join("notes.txt"), "x").unwrap();
        std::fs::write(root.join("zed-20250102-030405.json"), "{}").unwrap();

        let listed = BackupStore::new(&root).list().unwrap();
        assert_eq!(listed.keys().collect::<Vec<_>>(), vec!["zed"]);
    }

    #[test]
    fn list_of_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(BackupStore::new(temp.path().join("nope")).list().unwrap().is_empty());
    }

    #[test]
    fn delete_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("backups");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(temp.path().join("cursor-20250102-030405.json"), "{}").unwrap();

        let store = BackupStore::new(&root);
        let err = store
            .delete("cursor", "../cursor-20250102-030405.json")
            .unwrap_err();
        assert!(matches!(err, BackupError::InvalidPath { .. }));
        assert!(temp.path().join("cursor-20250102-030405.json").exists());
    }

    #[test]
    fn delete_refuses_other_clients_backup() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("backups");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("zed-20250102-030405.json"), "{}").unwrap();

        let store = BackupStore::new(&root);
        let err = store.delete("cursor", "zed-20250102-030405.json").unwrap_err();
        assert!(matches!(err, BackupError::FileNotFound { .. }));

        store.delete("zed", "zed-20250102-030405.json").unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn retention_keeps_newest() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("mcp.json");
        std::fs::write(&source, "{}").unwrap();
        let store = BackupStore::new(temp.path().join("backups"));

        for stamp in ["20250101-000000", "20250102-000000", "20250103-000000"] {
            store.snapshot_at("cursor", &source, ts(stamp)).unwrap();
        }
        store.snapshot_at("zed", &source, ts("20240101-000000")).unwrap();

        let removed = store.enforce_retention("cursor", 2).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].file_name, "cursor-20250101-000000.json");

        let listed = store.list().unwrap();
        assert_eq!(listed["cursor"].len(), 2);
        assert_eq!(listed["zed"].len(), 1);
        assert!(store.enforce_retention("cursor", 0).unwrap().is_empty());
    }

    #[test]
    fn latest_without_backups_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = BackupStore::new(temp.path()).latest("cursor").unwrap_err();
        assert!(matches!(err, BackupError::NotFound { .. }));
    }
}
