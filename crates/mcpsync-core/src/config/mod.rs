//! Configuration management
//!
//! Everything lives in one directory (`<config_dir>/mcpsync` by default):
//! - `config.toml`: configured clients, backup settings and sync state
//! - `mcp.json`: the canonical server set
//! - `backups/`: client file snapshots

pub mod canonical;
pub mod import;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use canonical::{CanonicalConfig, CanonicalStore};
pub use import::{ImportError, ImportReport, import_servers};
pub use parser::{parse_config, parse_config_str, to_toml};
pub use paths::{expand_path, resolve_identity};
pub use schema::{AppConfig, BackupSettings, ClientTarget, SyncSettings};
pub use store::ConfigStore;
