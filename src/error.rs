use thiserror::Error;

/// Error taxonomy of the sync engine.
///
/// Every variant that is not recovered locally aborts the whole
/// invocation; partial writes already committed stay in the store and the
/// `last_sync_at` watermark is left unadvanced so a retry can re-run
/// safely.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The user has no git configuration. Raised before any I/O happens.
    #[error("no git config for user '{user}'")]
    MissingConfig { user: String },

    /// Clone failed (authentication, network, missing branch or repo).
    /// Propagated unchanged, no retry.
    #[error("git clone failed: {0}")]
    Clone(#[from] git2::Error),

    /// The configured functions directory does not exist in the cloned
    /// tree. A content/configuration error, not a transient one.
    #[error("function directory not found in repository: {path}")]
    FunctionsDirNotFound { path: String },

    /// Reading or parsing the git configuration failed.
    #[error("config error: {0}")]
    Config(String),

    /// Token decryption failed.
    #[error("vault error: {0}")]
    Vault(String),

    /// The function store rejected a read or write.
    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
