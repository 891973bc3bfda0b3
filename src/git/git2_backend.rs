use git2::{Cred, FetchOptions, RemoteCallbacks, build::RepoBuilder};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::SyncError;
use super::VersionControlClient;

/// [`VersionControlClient`] backed by the `git2` crate.
pub struct Git2Client;

/// Build `FetchOptions` for a shallow, deadline-bounded transfer.
///
/// Tokens travel inside the clone URL; the credentials callback covers
/// the no-token case by falling back to the user's SSH agent. The
/// deadline is enforced from the transfer-progress callback: returning
/// `false` there makes libgit2 abort the fetch.
fn fetch_opts(deadline: Option<Instant>) -> FetchOptions<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")).or_else(|_| Cred::default())
    });
    if let Some(deadline) = deadline {
        cb.transfer_progress(move |_| Instant::now() < deadline);
    }

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(cb);
    fo.depth(1);
    fo
}

impl VersionControlClient for Git2Client {
    fn shallow_clone(
        &self,
        url: &str,
        dest: &Path,
        branch: &str,
        timeout: Option<Duration>,
    ) -> Result<(), SyncError> {
        let deadline = timeout.map(|t| Instant::now() + t);

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts(deadline));
        builder.branch(branch);

        // Restrict the fetch refspec to the tracked branch so the clone
        // is single-branch, not just shallow.
        let tracked = branch.to_string();
        builder.remote_create(move |repo, name, url| {
            repo.remote_with_fetch(
                name,
                url,
                &format!("+refs/heads/{tracked}:refs/remotes/origin/{tracked}"),
            )
        });

        debug!(dest = %dest.display(), branch, "cloning repository");
        builder.clone(url, dest)?;
        Ok(())
    }
}
