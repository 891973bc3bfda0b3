//! Enumeration and reading of function source files in a cloned tree.
//!
//! The file base name is the function name; this convention is the de
//! facto contract with the external repository and must hold in both
//! sync directions.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Extension of committed function source files.
pub const FUNCTION_EXT: &str = "ts";

/// One function source file found in the remote listing.
#[derive(Debug)]
pub struct FunctionFile {
    /// File base name, which is the function name.
    pub name: String,
    pub path: PathBuf,
}

/// Resolve the configured functions directory inside the cloned tree.
///
/// # Errors
/// A missing directory is a distinguished, user-facing error naming the
/// configured path, not a silent empty listing.
pub fn functions_dir(worktree: &Path, functions_path: &str) -> Result<PathBuf, SyncError> {
    let dir = worktree.join(functions_path);
    if !dir.is_dir() {
        return Err(SyncError::FunctionsDirNotFound {
            path: functions_path.to_string(),
        });
    }
    Ok(dir)
}

/// List function source files: regular files with the function
/// extension, directly inside `dir`. Returned in name order so results
/// are deterministic (ordering has no semantic effect).
pub fn list_function_files(dir: &Path) -> Result<Vec<FunctionFile>, SyncError> {
    let mut files = Vec::new();
    for ent in fs::read_dir(dir)? {
        let ent = ent?;
        if !ent.file_type()?.is_file() {
            continue;
        }
        let path = ent.path();
        if path.extension().and_then(OsStr::to_str) != Some(FUNCTION_EXT) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
            files.push(FunctionFile {
                name: stem.to_string(),
                path,
            });
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Read the raw (committed-dialect) text of one function file.
pub fn read_function_file(path: &Path) -> Result<String, SyncError> {
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_directory_is_a_distinguished_error() {
        let td = tempdir().unwrap();
        let err = functions_dir(td.path(), "functions").unwrap_err();
        match err {
            SyncError::FunctionsDirNotFound { path } => assert_eq!(path, "functions"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lists_only_function_files_in_name_order() {
        let td = tempdir().unwrap();
        let dir = td.path().join("functions");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("b.ts"), "b").unwrap();
        fs::write(dir.join("a.ts"), "a").unwrap();
        fs::write(dir.join("README.md"), "docs").unwrap();
        fs::write(dir.join("sub").join("nested.ts"), "nested").unwrap();

        let dir = functions_dir(td.path(), "functions").unwrap();
        let files = list_function_files(&dir).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn name_is_file_stem() {
        let td = tempdir().unwrap();
        let dir = td.path().join("fns");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("get-user.ts"), "x").unwrap();

        let files = list_function_files(&dir).unwrap();
        assert_eq!(files[0].name, "get-user");
        assert!(files[0].path.ends_with("get-user.ts"));
    }
}
