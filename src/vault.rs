use crate::error::SyncError;

/// Decrypts a stored access token for repository authentication.
///
/// The encryption primitive itself lives outside this crate; only the
/// call contract is fixed here. Server deployments plug in their own
/// implementation, the CLI uses [`PlainVault`].
pub trait CredentialVault: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Result<String, SyncError>;
}

/// Passthrough vault for tokens stored in cleartext in the local
/// `config.toml`.
pub struct PlainVault;

impl CredentialVault for PlainVault {
    fn decrypt(&self, ciphertext: &str) -> Result<String, SyncError> {
        Ok(ciphertext.to_string())
    }
}
