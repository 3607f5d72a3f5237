//! mcpsync Core Library
//!
//! Keeps one canonical set of MCP server definitions and writes it into the
//! configuration files of many client applications, each in its own document
//! format, with a backup of every file before it is touched.

pub mod backup;
pub mod clients;
pub mod codec;
pub mod config;
pub mod deploy;
pub mod fs;
pub mod mcp;
pub mod sync;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        AppConfig, CanonicalConfig, CanonicalStore, ClientTarget, ConfigStore, ImportError,
        ImportReport, import_servers,
    };

    // Servers and formats
    pub use crate::mcp::ServerSpec;
    pub use crate::types::DocumentFormat;

    // Codecs
    pub use crate::codec::{Codec, CodecError, Document, codec_for};

    // Backups
    pub use crate::backup::{BackupError, BackupRecord, BackupStore, RestoreSummary};

    // Apply
    pub use crate::deploy::{ApplyError, ApplyResult, BatchOptions, BatchReport, Deployer, Step};

    // Clients
    pub use crate::clients::{ClientCatalog, DetectedClient, HostEnv, HostOs};

    // Sync
    pub use crate::sync::{GistService, SnippetService, SyncError, SyncManager};
}
