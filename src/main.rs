//! # funsync
//!
//! **funsync** pulls cloud-function sources from a git repository into a
//! local function store.
//!
//! Features:
//! - Per-user repositories defined in `$(funsync home)/config.toml`
//! - `funsync pull` clones the configured branch and applies every function
//! - `funsync pull --only <name>` restricts the pull to selected functions
//! - `funsync preview` shows per-function changes and conflicts, writing nothing
//! - `funsync list` shows functions currently in the store
//! - `funsync home` prints the funsync home directory
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use funsync::{
    ChangeStatus, FunctionStore, Git2Client, JsonStore, Paths, PlainVault, SyncEngine, SyncOptions,
    TomlConfigProvider, funsync_home, paths,
};

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros. The subcommand is required: an
/// invocation carrying only global flags is a usage error, not a panic.
#[derive(Parser, Debug)]
#[command(
    name = "funsync",
    version,
    about = "funsync - git pull engine for cloud function stores",
    arg_required_else_help = true
)]
struct Cli {
    /// User to operate on (defaults to `default_user` from config.toml)
    #[arg(long, global = true)]
    user: Option<String>,
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Pull functions from the configured repository into the store
    Pull {
        /// Restrict the pull to these function names
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
    },
    /// Show per-function changes and conflicts without writing anything
    Preview,
    /// List functions in the local store
    List,
    /// Print the funsync home directory
    Home,
}

/// CLI entry point: parses arguments, wires the engine to the TOML
/// config, the JSON store and the git2 backend, and dispatches.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let p = paths()?;
    match cli.cmd {
        Cmd::Home => {
            println!("{}", funsync_home()?.display());
            Ok(())
        }
        Cmd::List => {
            let user = resolve_user(cli.user, &p)?;
            let store = JsonStore::new(p.store);
            for f in store.find_by_user(&user)? {
                let state = if f.published { "published" } else { "draft" };
                println!("- {} {} [{}]", f.name, f.path, state);
            }
            Ok(())
        }
        Cmd::Pull { only } => {
            let user = resolve_user(cli.user, &p)?;
            let engine = build_engine(p);
            let result = if only.is_empty() {
                engine.pull_from_git(&user)?
            } else {
                engine.selective_pull(&user, &only)?
            };
            for name in &result.added {
                println!("+ {name}");
            }
            for name in &result.updated {
                println!("~ {name}");
            }
            println!("{} added, {} updated", result.added.len(), result.updated.len());
            Ok(())
        }
        Cmd::Preview => {
            let user = resolve_user(cli.user, &p)?;
            let engine = build_engine(p);
            let preview = engine.preview_pull(&user)?;
            if preview.changes.is_empty() {
                println!("up to date");
                return Ok(());
            }
            for change in &preview.changes {
                let (mark, word) = match change.status {
                    ChangeStatus::Added => ("+", "added"),
                    ChangeStatus::Modified => ("~", "modified"),
                    ChangeStatus::Conflict => ("!", "conflict"),
                };
                match change.local_updated_at {
                    Some(at) if change.status == ChangeStatus::Conflict => {
                        println!("{mark} {} ({word}, local change at {at})", change.name)
                    }
                    _ => println!("{mark} {} ({word})", change.name),
                }
            }
            if preview.has_conflicts {
                eprintln!("conflicts detected: a pull would overwrite local changes");
            }
            Ok(())
        }
    }
}

/// `--user` if given, otherwise `default_user` from config.toml.
fn resolve_user(cli_user: Option<String>, p: &Paths) -> Result<String> {
    match cli_user {
        Some(user) => Ok(user),
        None => TomlConfigProvider::new(p.config.clone())
            .load()?
            .default_user
            .with_context(|| {
                format!("no --user given and no default_user in {}", p.config.display())
            }),
    }
}

fn build_engine(p: Paths) -> SyncEngine {
    SyncEngine::new(
        Box::new(TomlConfigProvider::new(p.config)),
        Box::new(PlainVault),
        Box::new(JsonStore::new(p.store)),
        Box::new(Git2Client),
        p.work,
        SyncOptions::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_alone_are_a_usage_error() {
        assert!(Cli::try_parse_from(["funsync", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["funsync", "--user", "alice"]).is_err());
    }

    #[test]
    fn subcommands_parse_with_global_flags() {
        let cli = Cli::try_parse_from(["funsync", "--user", "alice", "pull", "--only", "a"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        match cli.cmd {
            Cmd::Pull { only } => assert_eq!(only, vec!["a"]),
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }
}
