//! Fan the apply sequence out over many clients.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{ClientTarget, resolve_identity};

use super::{ApplyResult, Deployer};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Run groups of clients that write different files concurrently
    pub parallel: bool,
    /// Backups kept per client; 0 keeps all
    pub retention: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            retention: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// One result per client, sorted by client name
    pub results: Vec<ApplyResult>,
}

impl BatchReport {
    pub fn success(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ApplyResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ApplyResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn get(&self, client: &str) -> Option<&ApplyResult> {
        self.results.iter().find(|r| r.client == client)
    }
}

/// Clients sharing one physical file form a group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    File(PathBuf),
    /// Path could not be resolved; the client fails alone
    Unresolved(String),
}

type Group<'t> = Vec<(&'t str, &'t ClientTarget)>;

fn group_targets(targets: &BTreeMap<String, ClientTarget>) -> BTreeMap<GroupKey, Group<'_>> {
    let mut groups: BTreeMap<GroupKey, Group<'_>> = BTreeMap::new();
    for (name, target) in targets {
        let key = match target.resolve_path() {
            Ok(path) => GroupKey::File(resolve_identity(&path)),
            Err(_) => GroupKey::Unresolved(name.clone()),
        };
        groups.entry(key).or_default().push((name.as_str(), target));
    }
    groups
}

impl Deployer<'_> {
    /// Apply to every target.
    ///
    /// Clients writing the same file always run one after another. With
    /// `parallel`, distinct files are handled on scoped threads. A failing
    /// client never stops the others.
    pub fn apply_batch(
        &self,
        targets: &BTreeMap<String, ClientTarget>,
        options: BatchOptions,
    ) -> BatchReport {
        let deployer = self.with_retention(options.retention);
        let groups = group_targets(targets);
        tracing::debug!(
            clients = targets.len(),
            groups = groups.len(),
            parallel = options.parallel,
            "Starting batch apply"
        );

        let mut results: Vec<ApplyResult> = if options.parallel && groups.len() > 1 {
            std::thread::scope(|scope| {
                let handles: Vec<_> = groups
                    .into_values()
                    .map(|group| scope.spawn(move || run_group(&deployer, group)))
                    .collect();
                handles
                    .into_iter()
                    .flat_map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect()
            })
        } else {
            groups
                .into_values()
                .flat_map(|group| run_group(&deployer, group))
                .collect()
        };

        results.sort_by(|a, b| a.client.cmp(&b.client));
        BatchReport { results }
    }
}

fn run_group(deployer: &Deployer<'_>, group: Group<'_>) -> Vec<ApplyResult> {
    group
        .into_iter()
        .map(|(name, target)| deployer.apply_client(name, target))
        .collect()
}
