//! Apply the canonical server set to client files.
//!
//! One client runs `backup -> upsert each server -> prune`, stopping at the
//! first hard failure. A batch groups clients by the physical file they write
//! and never lets two groups touch the same file.

pub mod batch;
pub mod executor;

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::backup::BackupError;
use crate::codec::CodecError;

pub use batch::{BatchOptions, BatchReport};
pub use executor::Deployer;

/// The step of a client's apply sequence an error happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Server(String),
    Prune,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Server(name) => write!(f, "server '{}'", name),
            Step::Prune => f.write_str("removing obsolete servers"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("cannot resolve config path: {reason}")]
    PathResolution { reason: String },

    #[error("cannot determine the document format of '{}'; set `format` for this client", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("backup failed, nothing was applied: {0}")]
    Backup(#[from] BackupError),

    #[error("{step}: '{}' could not be parsed and was left untouched: {source}", path.display())]
    Parse {
        step: Step,
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("{step}: '{}' has an unexpected structure and was left untouched: {source}", path.display())]
    Shape {
        step: Step,
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("{step}: failed to render '{}': {source}", path.display())]
    Serialize {
        step: Step,
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("{step}: failed to {action} '{}': {source}", path.display())]
    Io {
        step: Step,
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ApplyError {
    pub(crate) fn from_codec(step: &Step, path: &std::path::Path, source: CodecError) -> Self {
        let step = step.clone();
        let path = path.to_path_buf();
        match source {
            CodecError::Parse { .. } => ApplyError::Parse { step, path, source },
            CodecError::Shape { .. } => ApplyError::Shape { step, path, source },
            CodecError::Serialize { .. } => ApplyError::Serialize { step, path, source },
        }
    }
}

/// Outcome of applying the canonical set to one client.
#[derive(Debug)]
pub struct ApplyResult {
    pub client: String,
    /// Resolved client file, when resolution succeeded
    pub path: Option<PathBuf>,
    pub success: bool,
    /// Backup taken before any mutation; `None` when there was nothing to back up
    pub backup_path: Option<PathBuf>,
    /// Servers applied before completion or failure
    pub applied: Vec<String>,
    pub pruned: Vec<String>,
    pub error: Option<ApplyError>,
}

impl ApplyResult {
    pub(crate) fn new(client: &str) -> Self {
        Self {
            client: client.to_string(),
            path: None,
            success: false,
            backup_path: None,
            applied: Vec::new(),
            pruned: Vec::new(),
            error: None,
        }
    }
}
