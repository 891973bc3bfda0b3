//! Ephemeral per-invocation workspaces.
//!
//! Every sync invocation clones into its own directory under the work
//! root and must leave nothing behind, no matter how it exits. The
//! [`Workspace`] guard ties removal to `Drop`, so cleanup runs on early
//! returns and panics alike.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Exclusively-owned scratch directory for one sync invocation.
///
/// The path is `{kind}-{user}-{timestamp}` under the work root: unique
/// per call in practice (wall-clock millis), not a hard guarantee.
/// Removal on drop is best-effort; failures are logged and swallowed,
/// never surfaced to the caller.
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create the workspace directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn acquire(work_root: &Path, kind: &str, user_id: &str) -> std::io::Result<Self> {
        let stamp = Utc::now().timestamp_millis();
        let path = work_root.join(format!("{kind}-{user_id}-{stamp}"));
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), "failed to remove workspace: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquire_creates_named_directory() {
        let td = tempdir().unwrap();
        let ws = Workspace::acquire(td.path(), "pull", "alice").unwrap();
        assert!(ws.path().is_dir());
        let name = ws.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("pull-alice-"));
    }

    #[test]
    fn drop_removes_tree_including_contents() {
        let td = tempdir().unwrap();
        let path = {
            let ws = Workspace::acquire(td.path(), "preview", "bob").unwrap();
            fs::create_dir_all(ws.path().join("nested/deep")).unwrap();
            fs::write(ws.path().join("nested/deep/f.ts"), "x").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn drop_tolerates_already_removed_tree() {
        let td = tempdir().unwrap();
        let ws = Workspace::acquire(td.path(), "pull", "carol").unwrap();
        fs::remove_dir_all(ws.path()).unwrap();
        drop(ws); // must not panic
    }
}
