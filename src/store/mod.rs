//! Function store: the persistent collection the engine syncs into.
//!
//! The engine only talks to the [`FunctionStore`] trait; the bundled
//! implementation is a JSON file per user ([`JsonStore`]). Single-record
//! inserts and updates are assumed atomic by the engine; it implements
//! no transaction across the records of one pull.

mod json_store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

pub use json_store::JsonStore;

/// One stored cloud function. `name` is unique per user and is derived
/// 1:1 from the committed file name (minus extension) during sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionRecord {
    pub name: String,
    /// Internal-dialect source.
    pub code: String,
    /// Derived execution artifact; cleared whenever `code` changes via
    /// sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled: Option<String>,
    /// HTTP route of the function.
    pub path: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub published: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    /// Authoritative signal for "modified since last sync" in conflict
    /// detection.
    pub updated_at: DateTime<Utc>,
}

impl FunctionRecord {
    /// Fresh record for a function first seen in the remote tree.
    pub fn from_sync(user_id: &str, name: &str, code: &str, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            compiled: None,
            path: format!("/{name}"),
            order: 0,
            published: false,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persistence seam the sync engine writes through.
pub trait FunctionStore: Send + Sync {
    fn find_by_user(&self, user_id: &str) -> Result<Vec<FunctionRecord>, SyncError>;

    /// Insert a new record. Fails if a record with the same name already
    /// exists for the user.
    fn insert(&self, record: FunctionRecord) -> Result<(), SyncError>;

    /// Overwrite the stored code of an existing record, clearing the
    /// cached compiled artifact and bumping `updated_at`.
    fn update_code(&self, user_id: &str, name: &str, code: &str) -> Result<(), SyncError>;

    /// Watermark of the last completed pull, if any.
    fn last_sync_at(&self, user_id: &str) -> Result<Option<DateTime<Utc>>, SyncError>;

    /// Advance the watermark. Called only by completed pulls.
    fn set_last_sync_at(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), SyncError>;
}
