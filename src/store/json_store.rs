use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use super::{FunctionRecord, FunctionStore};

/// Everything stored for one user: their functions plus the sync
/// watermark. Serialized as `<dir>/<user>.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UserState {
    #[serde(default)]
    last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    functions: Vec<FunctionRecord>,
}

/// [`FunctionStore`] keeping one JSON file per user under a store
/// directory. A missing file reads as an empty store.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn user_file(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }

    fn load(&self, user_id: &str) -> Result<UserState, SyncError> {
        let path = self.user_file(user_id);
        if !path.exists() {
            return Ok(UserState::default());
        }
        let txt = fs::read_to_string(&path)
            .map_err(|e| SyncError::Store(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&txt)
            .map_err(|e| SyncError::Store(format!("failed to parse {}: {e}", path.display())))
    }

    fn save(&self, user_id: &str, state: &UserState) -> Result<(), SyncError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| SyncError::Store(format!("failed to create store dir: {e}")))?;
        let path = self.user_file(user_id);
        let txt = serde_json::to_string_pretty(state)
            .map_err(|e| SyncError::Store(format!("failed to serialize store: {e}")))?;
        write_atomic(&path, &txt)
            .map_err(|e| SyncError::Store(format!("failed to write {}: {e}", path.display())))
    }
}

/// Write via a sibling temp file and rename, so a crash mid-write never
/// leaves a truncated store file.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

impl FunctionStore for JsonStore {
    fn find_by_user(&self, user_id: &str) -> Result<Vec<FunctionRecord>, SyncError> {
        Ok(self.load(user_id)?.functions)
    }

    fn insert(&self, record: FunctionRecord) -> Result<(), SyncError> {
        let mut state = self.load(&record.user_id)?;
        if state.functions.iter().any(|f| f.name == record.name) {
            return Err(SyncError::Store(format!(
                "function '{}' already exists for user '{}'",
                record.name, record.user_id
            )));
        }
        let user_id = record.user_id.clone();
        state.functions.push(record);
        self.save(&user_id, &state)
    }

    fn update_code(&self, user_id: &str, name: &str, code: &str) -> Result<(), SyncError> {
        let mut state = self.load(user_id)?;
        let rec = state
            .functions
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| {
                SyncError::Store(format!("no function '{name}' for user '{user_id}'"))
            })?;
        rec.code = code.to_string();
        rec.compiled = None;
        rec.updated_at = Utc::now();
        self.save(user_id, &state)
    }

    fn last_sync_at(&self, user_id: &str) -> Result<Option<DateTime<Utc>>, SyncError> {
        Ok(self.load(user_id)?.last_sync_at)
    }

    fn set_last_sync_at(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), SyncError> {
        let mut state = self.load(user_id)?;
        state.last_sync_at = Some(at);
        self.save(user_id, &state)
    }
}
