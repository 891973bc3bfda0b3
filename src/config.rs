use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::SyncError;

/// Git synchronization settings for one user.
///
/// Each user has at most one of these; its absence is a precondition
/// failure for every sync operation. Example TOML:
/// ```toml
/// [users.alice]
/// repo_url       = "https://github.com/acme/cloud-functions.git"
/// branch         = "main"
/// functions_path = "functions"
/// token          = "ghp_..."   # optional, handed to the vault
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct GitConfig {
    pub repo_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_functions_path")]
    pub functions_path: String,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_functions_path() -> String {
    "functions".to_string()
}

/// Top-level structure of `config.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// User to operate on when the CLI is invoked without `--user`.
    #[serde(default)]
    pub default_user: Option<String>,
    #[serde(default)]
    pub users: HashMap<String, GitConfig>,
}

/// Source of per-user git configuration.
///
/// Passed into [`crate::SyncEngine`] explicitly so the engine can be
/// exercised in tests without a config file on disk.
pub trait GitConfigProvider: Send + Sync {
    /// Fetch the git configuration for `user_id`, or `None` if the user
    /// has never configured a repository.
    fn get(&self, user_id: &str) -> Result<Option<GitConfig>, SyncError>;
}

/// [`GitConfigProvider`] backed by a TOML file.
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load and parse the whole config file.
    ///
    /// # Errors
    /// - Returns an error if the file cannot be read; the message includes
    ///   the resolved path.
    /// - Returns an error if parsing the TOML fails.
    pub fn load(&self) -> Result<ConfigFile, SyncError> {
        let txt = fs::read_to_string(&self.path).map_err(|e| {
            SyncError::Config(format!("config not found: {}: {e}", self.path.display()))
        })?;
        toml::from_str(&txt)
            .map_err(|e| SyncError::Config(format!("failed to parse {}: {e}", self.path.display())))
    }
}

impl GitConfigProvider for TomlConfigProvider {
    fn get(&self, user_id: &str) -> Result<Option<GitConfig>, SyncError> {
        let mut cfg = self.load()?;
        Ok(cfg.users.remove(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn get_returns_config_for_known_user() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.toml");
        fs::write(
            &path,
            r#"
default_user = "alice"

[users.alice]
repo_url = "https://example.com/acme/fns.git"
branch   = "trunk"
token    = "secret"
"#,
        )
        .unwrap();

        let provider = TomlConfigProvider::new(path);
        let cfg = provider.get("alice").unwrap().unwrap();
        assert_eq!(cfg.repo_url, "https://example.com/acme/fns.git");
        assert_eq!(cfg.branch, "trunk");
        assert_eq!(cfg.functions_path, "functions");
        assert_eq!(cfg.token.as_deref(), Some("secret"));
    }

    #[test]
    fn get_returns_none_for_unknown_user() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.toml");
        fs::write(&path, "[users.alice]\nrepo_url = \"u\"\n").unwrap();

        let provider = TomlConfigProvider::new(path);
        assert!(provider.get("bob").unwrap().is_none());
    }

    #[test]
    fn load_fails_with_path_in_message_when_missing() {
        let td = tempdir().unwrap();
        let path = td.path().join("no-such.toml");
        let provider = TomlConfigProvider::new(path);
        let err = provider.load().unwrap_err();
        assert!(err.to_string().contains("no-such.toml"));
    }
}
