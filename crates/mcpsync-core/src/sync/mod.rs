//! Cloud sync of the raw configuration files through a snippet service.
//!
//! Only `config.toml` and `mcp.json` travel. Push uploads them verbatim;
//! pull snapshots the local copies into `backups/sync-<timestamp>/` before
//! overwriting them.

pub mod gist;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeDelta, Timelike, Utc};

use crate::backup::TIMESTAMP_FORMAT;
use crate::config::store::{CANONICAL_FILE, CONFIG_FILE};
use crate::config::{AppConfig, ConfigStore};
use crate::fs::{copy_file, create_new_private_dir, create_private_dir, write_atomic};

pub use gist::GistService;

/// Files exchanged with the remote snippet.
pub const SYNCED_FILES: [&str; 2] = [CONFIG_FILE, CANONICAL_FILE];

const SNIPPET_DESCRIPTION: &str = "mcpsync configuration backup";

/// File name to raw content.
pub type SnippetFiles = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("sync is not linked; run `mcpsync sync link <token>` first")]
    NotLinked,

    #[error("nothing has been pushed yet; run `mcpsync sync push` first")]
    NoSnippet,

    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("snippet service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("{0:#}")]
    Config(anyhow::Error),
}

impl SyncError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        SyncError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A remote snippet as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    pub id: String,
    pub files: SnippetFiles,
}

/// Remote paste/snippet storage keyed by an opaque id.
pub trait SnippetService {
    fn create(&self, description: &str, files: &SnippetFiles) -> Result<Snippet, SyncError>;
    fn update(&self, id: &str, files: &SnippetFiles) -> Result<Snippet, SyncError>;
    fn fetch(&self, id: &str) -> Result<Snippet, SyncError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub snippet_id: String,
    pub created: bool,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    /// Where the previous local files were copied
    pub backup_dir: PathBuf,
    pub written: Vec<String>,
}

/// Store `token` in config.toml. Any previous snippet id is kept.
pub fn link(store: &ConfigStore, token: &str) -> Result<(), SyncError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SyncError::Config(anyhow::anyhow!("token cannot be empty")));
    }
    let mut config = store.load().map_err(SyncError::Config)?;
    config.sync.token = Some(token.to_string());
    store.save(&config).map_err(SyncError::Config)?;
    tracing::info!("Linked cloud sync");
    Ok(())
}

/// Token from config, or [`SyncError::NotLinked`].
pub fn linked_token(config: &AppConfig) -> Result<&str, SyncError> {
    config
        .sync
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(SyncError::NotLinked)
}

pub struct SyncManager<'a> {
    store: &'a ConfigStore,
    service: &'a dyn SnippetService,
}

impl<'a> SyncManager<'a> {
    pub fn new(store: &'a ConfigStore, service: &'a dyn SnippetService) -> Self {
        Self { store, service }
    }

    /// Upload the local files, creating the snippet on first push.
    pub fn push(&self) -> Result<PushReport, SyncError> {
        let mut config = self.store.load().map_err(SyncError::Config)?;
        linked_token(&config)?;

        let mut files = SnippetFiles::new();
        for name in SYNCED_FILES {
            let path = self.store.config_dir().join(name);
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    files.insert(name.to_string(), content);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(SyncError::io("read", &path, err)),
            }
        }

        let (snippet, created) = match config.sync.snippet_id.as_deref() {
            Some(id) if !id.is_empty() => (self.service.update(id, &files)?, false),
            _ => (self.service.create(SNIPPET_DESCRIPTION, &files)?, true),
        };
        tracing::info!(snippet = %snippet.id, created, "Pushed configuration");

        config.sync.snippet_id = Some(snippet.id.clone());
        config.sync.last_synced = Some(Utc::now());
        self.store.save(&config).map_err(SyncError::Config)?;

        Ok(PushReport {
            snippet_id: snippet.id,
            created,
            files: files.into_keys().collect(),
        })
    }

    /// Replace the local files with the snippet's copies.
    ///
    /// Unknown file names in the snippet are ignored. The link settings
    /// survive even when the pulled config.toml lacks them.
    pub fn pull(&self) -> Result<PullReport, SyncError> {
        let config = self.store.load().map_err(SyncError::Config)?;
        let token = linked_token(&config)?.to_string();
        let snippet_id = config
            .sync
            .snippet_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(SyncError::NoSnippet)?;

        let snippet = self.service.fetch(&snippet_id)?;

        let backup_root = self.store.backup_dir(&config).map_err(SyncError::Config)?;
        let backup_dir = create_pull_backup_dir(&backup_root)?;

        for name in SYNCED_FILES {
            let source = self.store.config_dir().join(name);
            if source.is_file() {
                copy_file(&source, &backup_dir.join(name))
                    .map_err(|e| SyncError::io("back up", &source, e))?;
            }
        }

        let mut written = Vec::new();
        for name in SYNCED_FILES {
            let Some(content) = snippet.files.get(name) else {
                continue;
            };
            let path = self.store.config_dir().join(name);
            write_atomic(&path, content.as_bytes()).map_err(|e| SyncError::io("write", &path, e))?;
            written.push(name.to_string());
        }

        let mut pulled = self.store.load().map_err(SyncError::Config)?;
        pulled.sync.token.get_or_insert(token);
        pulled.sync.snippet_id.get_or_insert(snippet_id);
        pulled.sync.last_synced = Some(Utc::now());
        self.store.save(&pulled).map_err(SyncError::Config)?;

        tracing::info!(files = ?written, backup = %backup_dir.display(), "Pulled configuration");
        Ok(PullReport {
            backup_dir,
            written,
        })
    }
}

/// A fresh `sync-<timestamp>` directory under `root`.
///
/// An earlier pull's directory is never reused: the timestamp moves forward
/// one second at a time until the name is free.
fn create_pull_backup_dir(root: &Path) -> Result<PathBuf, SyncError> {
    create_private_dir(root).map_err(|e| SyncError::io("create", root, e))?;

    let now = Local::now().naive_local();
    let mut stamp = now.with_nanosecond(0).unwrap_or(now);
    loop {
        let dir = root.join(format!("sync-{}", stamp.format(TIMESTAMP_FORMAT)));
        match create_new_private_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                stamp += TimeDelta::seconds(1);
            }
            Err(err) => return Err(SyncError::io("create", &dir, err)),
        }
    }
}
