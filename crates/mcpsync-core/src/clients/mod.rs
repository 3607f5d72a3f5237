//! Known MCP client applications and where they keep their configuration.
//!
//! The catalog is static data built once and passed explicitly to whoever
//! needs it. Detection takes a [`HostEnv`] instead of reading the process
//! environment, so it can run against any directory tree.

mod table;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ClientTarget;
use crate::types::DocumentFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    MacOs,
    Windows,
    Linux,
}

impl HostOs {
    /// The OS this binary was built for, if the catalog knows it.
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(HostOs::MacOs)
        } else if cfg!(target_os = "windows") {
            Some(HostOs::Windows)
        } else if cfg!(target_os = "linux") {
            Some(HostOs::Linux)
        } else {
            None
        }
    }
}

/// Directory a candidate path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDir {
    Home,
    /// `%APPDATA%`
    AppData,
    /// `%USERPROFILE%`
    UserProfile,
}

#[derive(Debug, Clone, Copy)]
pub struct PathCandidate {
    pub os: HostOs,
    pub base: BaseDir,
    pub relative: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct ClientDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub format: DocumentFormat,
    /// Override for where servers live inside the document
    pub key: Option<&'static str>,
    /// Candidates in preference order
    pub paths: &'static [PathCandidate],
}

impl ClientDefinition {
    /// Absolute candidate paths for the given host, in preference order.
    pub fn candidates(&self, env: &HostEnv) -> Vec<PathBuf> {
        self.resolve(env).into_iter().map(|(_, path)| path).collect()
    }

    /// Candidates paired with the base directory they were resolved against.
    fn resolve<'e>(&self, env: &'e HostEnv) -> Vec<(&'e Path, PathBuf)> {
        self.paths
            .iter()
            .filter(|candidate| candidate.os == env.os)
            .filter_map(|candidate| {
                let base = env.base(candidate.base)?;
                let path = candidate.relative.iter().fold(base.to_path_buf(), |p, s| p.join(s));
                Some((base, path))
            })
            .collect()
    }
}

/// Directories detection resolves candidate paths against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    pub os: HostOs,
    pub home: Option<PathBuf>,
    pub app_data: Option<PathBuf>,
    pub user_profile: Option<PathBuf>,
}

impl HostEnv {
    pub fn current() -> Option<Self> {
        let from_var = |name: &str| {
            std::env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        Some(Self {
            os: HostOs::current()?,
            home: dirs::home_dir(),
            app_data: from_var("APPDATA"),
            user_profile: from_var("USERPROFILE"),
        })
    }

    /// Environment rooted at one directory, every base pointing at `home`.
    pub fn rooted_at(os: HostOs, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            os,
            app_data: Some(home.clone()),
            user_profile: Some(home.clone()),
            home: Some(home),
        }
    }

    fn base(&self, base: BaseDir) -> Option<&Path> {
        let explicit = match base {
            BaseDir::Home => self.home.as_deref(),
            BaseDir::AppData => self.app_data.as_deref(),
            BaseDir::UserProfile => self.user_profile.as_deref(),
        };
        match (explicit, self.os) {
            (Some(path), _) => Some(path),
            // Windows shells without APPDATA/USERPROFILE still have a home
            (None, HostOs::Windows) => self.home.as_deref(),
            (None, _) => None,
        }
    }
}

/// A catalog client found on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedClient {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub key: Option<String>,
    /// False when only the parent directory exists and the file would be created
    pub exists: bool,
}

impl DetectedClient {
    pub fn target(&self) -> ClientTarget {
        let target = ClientTarget::from_path(&self.path, Some(self.format));
        match &self.key {
            Some(key) => target.with_key(key.clone()),
            None => target,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientCatalog {
    clients: Vec<ClientDefinition>,
}

impl Default for ClientCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ClientCatalog {
    pub fn new(clients: Vec<ClientDefinition>) -> Self {
        Self { clients }
    }

    pub fn builtin() -> Self {
        Self::new(table::BUILTIN.to_vec())
    }

    pub fn all(&self) -> &[ClientDefinition] {
        &self.clients
    }

    pub fn get(&self, id: &str) -> Option<&ClientDefinition> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Clients whose config file exists, or whose config directory exists so
    /// the file can be created. Existing files win over creatable ones. A file
    /// placed directly in a base directory only counts when it exists.
    pub fn detect(&self, env: &HostEnv) -> Vec<DetectedClient> {
        let mut found: Vec<DetectedClient> = self
            .clients
            .iter()
            .filter_map(|definition| detect_one(definition, env))
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// Detected clients as apply targets.
    pub fn detected_targets(&self, env: &HostEnv) -> BTreeMap<String, ClientTarget> {
        self.detect(env)
            .into_iter()
            .map(|client| (client.id.clone(), client.target()))
            .collect()
    }
}

fn detect_one(definition: &ClientDefinition, env: &HostEnv) -> Option<DetectedClient> {
    let candidates = definition.resolve(env);
    let existing = candidates.iter().find(|(_, path)| path.is_file());
    let (path, exists) = match existing {
        Some((_, path)) => (path.clone(), true),
        None => {
            let (_, creatable) = candidates.iter().find(|(base, path)| {
                path.parent()
                    .is_some_and(|parent| parent != *base && parent.is_dir())
            })?;
            (creatable.clone(), false)
        }
    };
    tracing::debug!(client = definition.id, path = %path.display(), exists, "Detected client");
    Some(DetectedClient {
        id: definition.id.to_string(),
        name: definition.name.to_string(),
        path,
        format: definition.format,
        key: definition.key.map(str::to_string),
        exists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_ids_are_unique() {
        let catalog = ClientCatalog::builtin();
        let mut ids: Vec<_> = catalog.all().iter().map(|c| c.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(total >= 30);
    }

    #[test]
    fn every_builtin_client_has_a_path_for_macos() {
        for client in ClientCatalog::builtin().all() {
            assert!(
                client.paths.iter().any(|p| p.os == HostOs::MacOs),
                "{} has no macOS path",
                client.id
            );
        }
    }

    #[test]
    fn candidates_follow_os_and_base() {
        let catalog = ClientCatalog::builtin();
        let claude = catalog.get("claude-desktop").unwrap();

        let linux = HostEnv::rooted_at(HostOs::Linux, "/home/u");
        assert_eq!(
            claude.candidates(&linux),
            vec![PathBuf::from("/home/u/.config/Claude/claude_desktop_config.json")]
        );

        let windows = HostEnv {
            os: HostOs::Windows,
            home: Some(PathBuf::from("C:/Users/u")),
            app_data: None,
            user_profile: None,
        };
        assert_eq!(
            claude.candidates(&windows),
            vec![PathBuf::from("C:/Users/u/Claude/claude_desktop_config.json")]
        );
    }

    #[test]
    fn missing_base_outside_windows_yields_nothing() {
        let env = HostEnv {
            os: HostOs::Linux,
            home: None,
            app_data: None,
            user_profile: None,
        };
        let cursor = ClientCatalog::builtin();
        assert!(cursor.get("cursor").unwrap().candidates(&env).is_empty());
    }

    #[test]
    fn detects_existing_file_and_creatable_dir() {
        let temp = TempDir::new().unwrap();
        let home = temp.path();
        std::fs::create_dir_all(home.join(".cursor")).unwrap();
        std::fs::write(home.join(".cursor/mcp.json"), "{}").unwrap();
        std::fs::create_dir_all(home.join(".config/goose")).unwrap();

        let env = HostEnv::rooted_at(HostOs::Linux, home);
        let detected = ClientCatalog::builtin().detect(&env);
        let ids: Vec<_> = detected.iter().map(|c| c.id.as_str()).collect();

        assert!(ids.contains(&"cursor"));
        assert!(ids.contains(&"goose"));

        let cursor = detected.iter().find(|c| c.id == "cursor").unwrap();
        assert!(cursor.exists);
        let goose = detected.iter().find(|c| c.id == "goose").unwrap();
        assert!(!goose.exists);
        assert_eq!(goose.format, DocumentFormat::Yaml);
    }

    #[test]
    fn home_level_files_need_to_exist() {
        let temp = TempDir::new().unwrap();
        let env = HostEnv::rooted_at(HostOs::Linux, temp.path());
        let catalog = ClientCatalog::builtin();
        assert!(catalog.detect(&env).is_empty());

        std::fs::write(temp.path().join(".claude.json"), "{}").unwrap();
        let detected = catalog.detect(&env);
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].id, "claude-code");
        assert!(detected[0].exists);
    }

    #[test]
    fn existing_file_beats_earlier_creatable_candidate() {
        let temp = TempDir::new().unwrap();
        let home = temp.path();
        std::fs::create_dir_all(home.join(".llm-tools-mcp")).unwrap();
        std::fs::create_dir_all(home.join(".config/io.datasette.llm")).unwrap();
        std::fs::write(home.join(".config/io.datasette.llm/mcp.json"), "{}").unwrap();

        let env = HostEnv::rooted_at(HostOs::Linux, home);
        let detected = ClientCatalog::builtin().detect(&env);
        let llm = detected.iter().find(|c| c.id == "llm-cli").unwrap();
        assert!(llm.exists);
        assert!(llm.path.ends_with(".config/io.datasette.llm/mcp.json"));
    }

    #[test]
    fn detected_target_carries_format_and_key() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".config/Code/User")).unwrap();

        let env = HostEnv::rooted_at(HostOs::Linux, temp.path());
        let targets = ClientCatalog::builtin().detected_targets(&env);

        assert_eq!(targets["vscode"].format, Some(DocumentFormat::VsCode));
        assert_eq!(targets["vscode"].key, None);
        assert_eq!(targets["cody"].key.as_deref(), Some("openctx.providers"));
        assert_eq!(targets["cody"].config_path, targets["vscode"].config_path);
    }
}
