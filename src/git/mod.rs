//! Git integration layer.
//!
//! Exposes the [`VersionControlClient`] seam the sync engine clones
//! through, plus the authenticated-URL helper. The actual backend
//! (currently the `git2` crate) stays behind this module boundary so an
//! alternative implementation, or a test double, can be swapped in
//! without touching the rest of the codebase.

mod auth;
mod git2_backend;

use std::path::Path;
use std::time::Duration;

use crate::error::SyncError;

pub use auth::authenticated_url;
pub use git2_backend::Git2Client;

/// Fetches a working tree of the remote repository.
///
/// One failed clone aborts the whole sync operation; there is no retry
/// policy at this layer.
pub trait VersionControlClient: Send + Sync {
    /// Shallow (depth 1), single-branch clone of `url` into `dest`.
    ///
    /// `timeout` bounds the transfer; `None` lets an unresponsive remote
    /// block indefinitely.
    ///
    /// # Errors
    /// Fails on authentication failure, network failure, nonexistent
    /// branch, nonexistent repository, or an expired timeout.
    fn shallow_clone(
        &self,
        url: &str,
        dest: &Path,
        branch: &str,
        timeout: Option<Duration>,
    ) -> Result<(), SyncError>;
}
