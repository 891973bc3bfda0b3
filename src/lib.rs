//! Crate entry point for **funsync**.
//!
//! This library implements the git synchronization engine behind the
//! `funsync` CLI: it reconciles a user's stored cloud functions with an
//! external git repository (full pull, dry-run preview with conflict
//! detection, selective pull). Each submodule encapsulates one
//! responsibility (configuration, git operations, the function store,
//! dialect conversion, the engine itself). The `pub use` re-exports
//! make the engine and its collaborator seams accessible from the crate
//! root.

mod config;
mod convert;
mod error;
mod git;
mod paths;
mod store;
mod sync;
mod vault;
mod workspace;

/// Re-export the engine, its collaborator traits and the bundled
/// implementations so embedders can wire everything from `funsync::*`.
pub use config::{ConfigFile, GitConfig, GitConfigProvider, TomlConfigProvider};
pub use convert::{to_committed, to_internal};
pub use error::SyncError;
pub use git::{Git2Client, VersionControlClient, authenticated_url};
pub use paths::{Paths, funsync_home, paths};
pub use store::{FunctionRecord, FunctionStore, JsonStore};
pub use sync::classify::{ChangeStatus, SyncChange};
pub use sync::{PreviewResult, PullResult, SyncEngine, SyncOptions};
pub use vault::{CredentialVault, PlainVault};
