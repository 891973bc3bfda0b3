//! Git synchronization engine.
//!
//! Reconciles a user's stored functions with an external git
//! repository. Three entry points share one pipeline (authenticated
//! URL, ephemeral workspace, shallow clone, read, convert) and differ
//! only in what they do with the result:
//!
//! - [`SyncEngine::pull_from_git`]: insert or overwrite every remote
//!   function, remote always wins, then advance the watermark.
//! - [`SyncEngine::preview_pull`]: classify every remote function
//!   against the store without writing anything.
//! - [`SyncEngine::selective_pull`]: apply a caller-chosen subset of
//!   names, best-effort over the requested set.
//!
//! The workspace is released on every exit path; see
//! [`crate::workspace::Workspace`].

pub mod classify;
mod reader;

use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{GitConfig, GitConfigProvider};
use crate::convert;
use crate::error::SyncError;
use crate::git::{VersionControlClient, authenticated_url};
use crate::store::{FunctionRecord, FunctionStore};
use crate::vault::CredentialVault;
use crate::workspace::Workspace;

use classify::{ChangeStatus, SyncChange, classify};
use reader::FUNCTION_EXT;

/// Outcome of a full or selective pull. `deleted` stays empty: the
/// engine never removes local functions absent from the remote tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PullResult {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
}

/// Outcome of a preview: the non-unchanged entries, plus whether any of
/// them is a conflict.
#[derive(Debug)]
pub struct PreviewResult {
    pub changes: Vec<SyncChange>,
    pub has_conflicts: bool,
}

/// Named policies of the engine.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// During a selective pull, a requested name with no matching remote
    /// file (or an unreadable one) is skipped rather than failing the
    /// whole operation.
    pub skip_missing_selected: bool,
    /// Upper bound on clone transfer time; `None` lets an unresponsive
    /// remote block indefinitely.
    pub clone_timeout: Option<Duration>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            skip_missing_selected: true,
            clone_timeout: Some(Duration::from_secs(120)),
        }
    }
}

/// The sync engine. All collaborators are injected so the pipeline runs
/// against fakes in tests; see the trait seams in [`crate::config`],
/// [`crate::vault`], [`crate::store`] and [`crate::git`].
pub struct SyncEngine {
    config: Box<dyn GitConfigProvider>,
    vault: Box<dyn CredentialVault>,
    store: Box<dyn FunctionStore>,
    vcs: Box<dyn VersionControlClient>,
    work_root: PathBuf,
    options: SyncOptions,
    /// Per-user leases: two concurrent syncs for the same user serialize
    /// on one of these, so their writes and watermark updates cannot
    /// interleave.
    leases: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// A cloned working tree tied to the lifetime of its workspace.
struct Worktree {
    config: GitConfig,
    workspace: Workspace,
}

impl Worktree {
    fn functions_dir(&self) -> Result<PathBuf, SyncError> {
        reader::functions_dir(self.workspace.path(), &self.config.functions_path)
    }
}

impl SyncEngine {
    pub fn new(
        config: Box<dyn GitConfigProvider>,
        vault: Box<dyn CredentialVault>,
        store: Box<dyn FunctionStore>,
        vcs: Box<dyn VersionControlClient>,
        work_root: PathBuf,
        options: SyncOptions,
    ) -> Self {
        Self {
            config,
            vault,
            store,
            vcs,
            work_root,
            options,
            leases: Mutex::new(HashMap::new()),
        }
    }

    /// Full pull: every remote function is inserted (if absent locally)
    /// or overwritten (if present) with the converted remote code, and
    /// the cached compiled artifact is cleared. No conflict check is
    /// performed; remote always wins. Advances `last_sync_at` on
    /// completion, even for an empty file set.
    pub fn pull_from_git(&self, user_id: &str) -> Result<PullResult, SyncError> {
        let lease = self.lease(user_id);
        let _guard = lease.lock().unwrap_or_else(PoisonError::into_inner);

        let worktree = self.fetch_worktree(user_id, "pull")?;
        let dir = worktree.functions_dir()?;
        let files = reader::list_function_files(&dir)?;
        let locals = self.local_names(user_id)?;

        let mut result = PullResult::default();
        for file in &files {
            let code = convert::to_internal(&reader::read_function_file(&file.path)?);
            if locals.contains_key(&file.name) {
                self.store.update_code(user_id, &file.name, &code)?;
                result.updated.push(file.name.clone());
            } else {
                self.store
                    .insert(FunctionRecord::from_sync(user_id, &file.name, &code, Utc::now()))?;
                result.added.push(file.name.clone());
            }
        }

        self.store.set_last_sync_at(user_id, Utc::now())?;
        info!(
            user = user_id,
            added = result.added.len(),
            updated = result.updated.len(),
            "pull complete"
        );
        Ok(result)
    }

    /// Dry run: runs the clone + read + classify pipeline, applies no
    /// writes and does not advance the watermark.
    pub fn preview_pull(&self, user_id: &str) -> Result<PreviewResult, SyncError> {
        let lease = self.lease(user_id);
        let _guard = lease.lock().unwrap_or_else(PoisonError::into_inner);

        let worktree = self.fetch_worktree(user_id, "preview")?;
        let dir = worktree.functions_dir()?;
        let files = reader::list_function_files(&dir)?;
        let locals = self.local_names(user_id)?;
        let watermark = self.store.last_sync_at(user_id)?;

        let mut changes = Vec::new();
        for file in &files {
            let remote_code = convert::to_internal(&reader::read_function_file(&file.path)?);
            let local = locals.get(&file.name);
            let Some(status) = classify(local, &remote_code, watermark) else {
                continue;
            };
            changes.push(SyncChange {
                name: file.name.clone(),
                status,
                local_code: local.map(|r| r.code.clone()),
                remote_code: Some(remote_code),
                local_updated_at: local.map(|r| r.updated_at),
            });
        }

        let has_conflicts = changes.iter().any(|c| c.status == ChangeStatus::Conflict);
        Ok(PreviewResult {
            changes,
            has_conflicts,
        })
    }

    /// Pull restricted to the requested function names. A requested name
    /// with no remote file is skipped per
    /// [`SyncOptions::skip_missing_selected`]; found files are applied
    /// exactly like a full pull, and the watermark advances the same
    /// way.
    pub fn selective_pull(&self, user_id: &str, names: &[String]) -> Result<PullResult, SyncError> {
        let lease = self.lease(user_id);
        let _guard = lease.lock().unwrap_or_else(PoisonError::into_inner);

        let worktree = self.fetch_worktree(user_id, "selective")?;
        let dir = worktree.functions_dir()?;
        let locals = self.local_names(user_id)?;

        let mut result = PullResult::default();
        for name in names {
            let path = dir.join(format!("{name}.{FUNCTION_EXT}"));
            let raw = match reader::read_function_file(&path) {
                Ok(raw) => raw,
                Err(e) if self.options.skip_missing_selected => {
                    debug!(user = user_id, name, "skipping requested function: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let code = convert::to_internal(&raw);
            if locals.contains_key(name) {
                self.store.update_code(user_id, name, &code)?;
                result.updated.push(name.clone());
            } else {
                self.store
                    .insert(FunctionRecord::from_sync(user_id, name, &code, Utc::now()))?;
                result.added.push(name.clone());
            }
        }

        self.store.set_last_sync_at(user_id, Utc::now())?;
        info!(
            user = user_id,
            requested = names.len(),
            added = result.added.len(),
            updated = result.updated.len(),
            "selective pull complete"
        );
        Ok(result)
    }

    /// Shared front half of the pipeline: config → token → workspace →
    /// clone. The returned [`Worktree`] owns the workspace, so dropping
    /// it (on success and on every error path above the caller) removes
    /// the clone.
    fn fetch_worktree(&self, user_id: &str, kind: &str) -> Result<Worktree, SyncError> {
        let config = self.config.get(user_id)?.ok_or_else(|| SyncError::MissingConfig {
            user: user_id.to_string(),
        })?;

        let token = match &config.token {
            Some(ciphertext) => Some(self.vault.decrypt(ciphertext)?),
            None => None,
        };
        let url = authenticated_url(&config.repo_url, token.as_deref());

        let workspace = Workspace::acquire(&self.work_root, kind, user_id)?;
        self.vcs.shallow_clone(
            &url,
            workspace.path(),
            &config.branch,
            self.options.clone_timeout,
        )?;

        Ok(Worktree { config, workspace })
    }

    fn local_names(&self, user_id: &str) -> Result<HashMap<String, FunctionRecord>, SyncError> {
        Ok(self
            .store
            .find_by_user(user_id)?
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect())
    }

    fn lease(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut leases = self.leases.lock().unwrap_or_else(PoisonError::into_inner);
        leases.entry(user_id.to_string()).or_default().clone()
    }
}
