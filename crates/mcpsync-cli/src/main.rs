//! mcpsync - one MCP server list for every client
//!
//! Usage:
//!   mcpsync apply             # write mcp.json into every client config
//!   mcpsync restore           # roll every client back to its newest backup
//!   mcpsync import [FILE]     # merge `mcpServers` from a file or stdin
//!   mcpsync clients           # show configured and detected clients
//!   mcpsync sync push|pull    # share config through a private gist

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpsync_core::backup::BackupRecord;
use mcpsync_core::clients::{ClientCatalog, HostEnv};
use mcpsync_core::config::{AppConfig, ClientTarget, ConfigStore, import_servers};
use mcpsync_core::deploy::{ApplyResult, BatchOptions, Deployer};
use mcpsync_core::sync::{self, GistService, SyncManager};

#[derive(Parser)]
#[command(name = "mcpsync")]
#[command(about = "Sync MCP server definitions across AI clients", long_about = None)]
struct Cli {
    /// Use this directory instead of the default config directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the canonical server set to client configs
    ///
    /// Every client file is backed up before it is modified. Servers missing
    /// from mcp.json are removed from the clients.
    Apply {
        /// Only apply to this client (repeatable)
        #[arg(long = "client", value_name = "NAME")]
        clients: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,

        /// Process clients one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Restore client configs from backups
    ///
    /// Without --client, every client with a backup is restored to its newest one.
    Restore {
        /// Only restore this client
        #[arg(long, value_name = "NAME")]
        client: Option<String>,

        /// Restore this backup file instead of the newest
        #[arg(long, value_name = "FILE", requires = "client")]
        file: Option<String>,
    },

    /// Inspect and prune backups
    Backups(BackupsArgs),

    /// Merge `mcpServers` from a JSON file (or stdin) into mcp.json
    Import {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },

    /// Show configured and detected clients
    Clients,

    /// Share config.toml and mcp.json through a private GitHub gist
    Sync(SyncArgs),
}

#[derive(Args)]
struct BackupsArgs {
    #[command(subcommand)]
    command: BackupsSubcommand,
}

#[derive(Subcommand)]
enum BackupsSubcommand {
    /// List backups, newest first
    List {
        /// Only list backups of this client
        #[arg(long, value_name = "NAME")]
        client: Option<String>,
    },

    /// Delete one backup file
    Delete {
        /// Client the backup belongs to
        client: String,
        /// Backup file name as shown by `backups list`
        file: String,
    },
}

#[derive(Args)]
struct SyncArgs {
    #[command(subcommand)]
    command: SyncSubcommand,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Store a GitHub token with gist scope
    Link {
        token: String,
    },
    /// Upload local config files
    Push,
    /// Replace local config files with the gist's copies
    Pull,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcpsync=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match cli.config_dir {
        Some(dir) => ConfigStore::from_paths(dir),
        None => ConfigStore::from_default_dir()?,
    };

    if !run_cli(&store, cli.command)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Run one command. `Ok(false)` means some clients failed.
fn run_cli(store: &ConfigStore, command: Commands) -> Result<bool> {
    match command {
        Commands::Apply {
            clients,
            yes,
            sequential,
        } => run_apply(store, &clients, yes, sequential),
        Commands::Restore { client, file } => run_restore(store, client, file),
        Commands::Backups(args) => {
            run_backups(store, args)?;
            Ok(true)
        }
        Commands::Import { file } => {
            let content = read_import(file)?;
            run_import(store, &content)?;
            Ok(true)
        }
        Commands::Clients => {
            run_clients(store)?;
            Ok(true)
        }
        Commands::Sync(args) => {
            run_sync(store, args)?;
            Ok(true)
        }
    }
}

/// Configured clients, or the detected ones when none are configured.
fn resolve_targets(config: &AppConfig) -> Result<BTreeMap<String, ClientTarget>> {
    if !config.clients.is_empty() {
        return Ok(config.clients.clone());
    }
    let env = HostEnv::current().context("Client detection is not supported on this platform")?;
    let detected = ClientCatalog::builtin().detected_targets(&env);
    tracing::debug!(count = detected.len(), "No clients configured, using detected clients");
    Ok(detected)
}

fn run_apply(store: &ConfigStore, only: &[String], yes: bool, sequential: bool) -> Result<bool> {
    let config = store.load()?;
    config.validate()?;
    let canonical = store.canonical().load()?;

    let mut targets = resolve_targets(&config)?;
    if config.clients.is_empty() {
        println!(
            "No clients configured in {}; using {} detected client(s)",
            store.config_path().display(),
            targets.len()
        );
    }
    if !only.is_empty() {
        if let Some(unknown) = only.iter().find(|name| !targets.contains_key(*name)) {
            anyhow::bail!("Unknown client '{}'", unknown);
        }
        targets.retain(|name, _| only.contains(name));
    }
    if targets.is_empty() {
        println!("No clients to apply to.");
        return Ok(true);
    }

    for warning in canonical.warnings() {
        println!("{} {}", style("⚠").yellow(), warning);
    }

    println!("Servers ({}):", canonical.mcp_servers.len());
    for name in canonical.mcp_servers.keys() {
        println!("  {}", style(name).cyan());
    }
    if canonical.mcp_servers.is_empty() {
        println!(
            "  {}",
            style("(none: every server will be removed from the clients)").yellow()
        );
    }
    println!("Clients ({}):", targets.len());
    for (name, target) in &targets {
        println!("  {:<18} {}", name, style(&target.config_path).dim());
    }
    println!();

    if !yes && !confirm("Back up and apply to these clients?")? {
        println!("Aborted.");
        return Ok(true);
    }

    let backups = store.backup_store(&config)?;
    let report = Deployer::new(&canonical, &backups).apply_batch(
        &targets,
        BatchOptions {
            parallel: !sequential,
            retention: config.backups.retention,
        },
    );

    for result in &report.results {
        print_apply_result(result);
    }
    let failed = report.failed().count();
    println!();
    if failed == 0 {
        println!("Applied to {} client(s)", report.results.len());
    } else {
        println!(
            "Applied to {} client(s), {} failed",
            report.results.len() - failed,
            style(failed).red()
        );
    }
    Ok(report.success())
}

fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        anyhow::bail!("Confirmation required; re-run with --yes");
    }
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

fn print_apply_result(result: &ApplyResult) {
    match &result.error {
        None => {
            let mut details = vec![format!("{} server(s)", result.applied.len())];
            if !result.pruned.is_empty() {
                details.push(format!("removed {}", result.pruned.join(", ")));
            }
            if let Some(backup) = result.backup_path.as_ref().and_then(|p| p.file_name()) {
                details.push(format!("backup {}", backup.to_string_lossy()));
            }
            println!(
                "{} {:<18} {}",
                style("✓").green(),
                result.client,
                style(details.join(", ")).dim()
            );
        }
        Some(err) => {
            println!("{} {:<18} {}", style("✗").red(), result.client, err);
        }
    }
}

fn run_restore(store: &ConfigStore, client: Option<String>, file: Option<String>) -> Result<bool> {
    let config = store.load()?;
    let backups = store.backup_store(&config)?;
    let targets = resolve_targets(&config)?;

    let Some(client) = client else {
        let summary = backups.restore_all(&targets)?;
        for (name, record) in &summary.restored {
            println!("{} {:<18} {}", style("✓").green(), name, style(&record.file_name).dim());
        }
        for (name, err) in &summary.errors {
            println!("{} {:<18} {}", style("✗").red(), name, err);
        }
        for name in &summary.skipped {
            println!("• {:<18} {}", name, style("no backups").dim());
        }
        if summary.restored.is_empty() && summary.errors.is_empty() {
            println!("No backups to restore.");
        }
        return Ok(summary.is_success());
    };

    let target = targets
        .get(&client)
        .with_context(|| format!("Client '{}' is not configured", client))?;
    let path = target.resolve_path()?;
    let record = match file {
        Some(file) => backups.restore_file(&client, &file, &path)?,
        None => backups.restore_latest(&client, &path)?,
    };
    println!(
        "{} Restored {} from {}",
        style("✓").green(),
        client,
        record.file_name
    );
    Ok(true)
}

fn run_backups(store: &ConfigStore, args: BackupsArgs) -> Result<()> {
    let config = store.load()?;
    let backups = store.backup_store(&config)?;

    match args.command {
        BackupsSubcommand::List { client } => {
            let mut listed = backups.list()?;
            if let Some(client) = client {
                listed.retain(|name, _| *name == client);
            }
            if listed.is_empty() {
                println!("No backups in {}", backups.root().display());
                return Ok(());
            }
            for (client, records) in &listed {
                println!("{} ({}):", style(client).bold(), records.len());
                for record in records {
                    print_backup(record);
                }
            }
        }
        BackupsSubcommand::Delete { client, file } => {
            let record = backups.delete(&client, &file)?;
            println!("✓ Deleted {}", record.file_name);
        }
    }
    Ok(())
}

fn print_backup(record: &BackupRecord) {
    println!(
        "  {}  {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.file_name
    );
}

fn read_import(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read import file: {}", path.display())),
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read import content from stdin")?;
            Ok(content)
        }
    }
}

fn run_import(store: &ConfigStore, content: &str) -> Result<()> {
    let report = import_servers(&store.canonical(), content)?;
    if report.count == 0 {
        println!("• No servers found to import");
        return Ok(());
    }
    println!(
        "✓ Imported {} server(s) into {}",
        report.count,
        store.canonical_path().display()
    );
    for name in &report.merged {
        println!("  {}", style(name).cyan());
    }
    Ok(())
}

fn run_clients(store: &ConfigStore) -> Result<()> {
    let config = store.load()?;

    if config.clients.is_empty() {
        println!("Configured: none (apply uses detected clients)");
    } else {
        println!("Configured ({}):", config.clients.len());
        for (name, target) in &config.clients {
            let format = target
                .resolve_path()
                .ok()
                .and_then(|path| target.resolve_format(name, &path))
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("  {:<18} {:<15} {}", name, format, target.config_path);
        }
    }
    println!();

    let Some(env) = HostEnv::current() else {
        println!("Detection is not supported on this platform.");
        return Ok(());
    };
    let detected = ClientCatalog::builtin().detect(&env);
    println!("Detected ({}):", detected.len());
    for client in &detected {
        let marker = if client.exists {
            style("●").green()
        } else {
            style("○").dim()
        };
        println!(
            "  {} {:<18} {:<15} {}",
            marker,
            client.id,
            client.format.to_string(),
            client.path.display()
        );
    }
    Ok(())
}

fn run_sync(store: &ConfigStore, args: SyncArgs) -> Result<()> {
    match args.command {
        SyncSubcommand::Link { token } => {
            sync::link(store, &token)?;
            println!("✓ Linked. Run `mcpsync sync push` to upload your configuration.");
        }
        SyncSubcommand::Push => {
            let config = store.load()?;
            let service = GistService::new(sync::linked_token(&config)?);
            let report = SyncManager::new(store, &service).push()?;
            let verb = if report.created { "Created" } else { "Updated" };
            println!(
                "✓ {} gist {} ({})",
                verb,
                report.snippet_id,
                report.files.join(", ")
            );
        }
        SyncSubcommand::Pull => {
            let config = store.load()?;
            let service = GistService::new(sync::linked_token(&config)?);
            let report = SyncManager::new(store, &service).pull()?;
            println!("✓ Pulled {}", report.written.join(", "));
            println!(
                "  Previous files saved to {}",
                style(report.backup_dir.display()).dim()
            );
        }
    }
    Ok(())
}
