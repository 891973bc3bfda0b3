use anyhow::Result;
use std::{env, path::PathBuf};

/// Directory layout under the funsync home.
#[derive(Clone)]
pub struct Paths {
    /// Per-user JSON store files.
    pub store: PathBuf,
    /// Ephemeral sync workspaces.
    pub work: PathBuf,
    pub config: PathBuf,
}

/// Resolve the funsync home directory.
///
/// `FUNSYNC_HOME` wins if set; otherwise `$XDG_CONFIG_HOME/.funsync`,
/// falling back to `$HOME/.config/.funsync`.
pub fn funsync_home() -> Result<PathBuf> {
    if let Some(home) = env::var_os("FUNSYNC_HOME") {
        return Ok(PathBuf::from(home));
    }
    let xdg = env::var_os("XDG_CONFIG_HOME");
    let base = xdg
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env::var_os("HOME").unwrap_or_default()).join(".config"));
    Ok(base.join(".funsync"))
}

pub fn paths() -> Result<Paths> {
    let home = funsync_home()?;
    Ok(Paths {
        store: home.join("store"),
        work: home.join("work"),
        config: home.join("config.toml"),
    })
}
