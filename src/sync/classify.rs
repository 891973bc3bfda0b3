//! Per-function change classification for pull previews.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::FunctionRecord;

/// How a remote function relates to the local store. Unchanged
/// functions are omitted from preview output entirely, so they have no
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Conflict,
}

/// One entry of a pull preview. Constructed during a single preview
/// invocation and discarded with the response; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SyncChange {
    pub name: String,
    pub status: ChangeStatus,
    pub local_code: Option<String>,
    pub remote_code: Option<String>,
    pub local_updated_at: Option<DateTime<Utc>>,
}

/// Classify one remote function against the local record and the
/// last-sync watermark. `None` means unchanged.
///
/// Decision table:
///
/// | local exists? | remote == local? | modified after watermark? | result |
/// |---|---|---|---|
/// | no  | -   | -          | `Added` |
/// | yes | yes | -          | `None` (unchanged) |
/// | yes | no  | yes        | `Conflict` |
/// | yes | no  | no/unknown | `Modified` |
///
/// "Modified after watermark" is strict: the watermark must be present
/// and `updated_at` strictly newer. An absent watermark never yields a
/// conflict (a first-ever sync cannot conflict). This is a heuristic,
/// not a causal merge check: a local edit made before the watermark
/// that happens to differ from the new remote content classifies as a
/// plain `Modified` overwrite candidate.
pub fn classify(
    local: Option<&FunctionRecord>,
    remote_code: &str,
    last_sync_at: Option<DateTime<Utc>>,
) -> Option<ChangeStatus> {
    let Some(local) = local else {
        return Some(ChangeStatus::Added);
    };
    if local.code == remote_code {
        return None;
    }
    match last_sync_at {
        Some(mark) if local.updated_at > mark => Some(ChangeStatus::Conflict),
        _ => Some(ChangeStatus::Modified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(code: &str, updated_at: DateTime<Utc>) -> FunctionRecord {
        let mut rec = FunctionRecord::from_sync("u", "f", code, updated_at);
        rec.updated_at = updated_at;
        rec
    }

    #[test]
    fn absent_local_is_added() {
        assert_eq!(classify(None, "code", None), Some(ChangeStatus::Added));
        assert_eq!(
            classify(None, "code", Some(Utc::now())),
            Some(ChangeStatus::Added)
        );
    }

    #[test]
    fn equal_code_is_unchanged_regardless_of_watermark() {
        let now = Utc::now();
        let rec = record("same", now);
        assert_eq!(classify(Some(&rec), "same", None), None);
        assert_eq!(classify(Some(&rec), "same", Some(now - Duration::hours(1))), None);
        assert_eq!(classify(Some(&rec), "same", Some(now + Duration::hours(1))), None);
    }

    #[test]
    fn local_edit_after_watermark_is_conflict() {
        let mark = Utc::now();
        let rec = record("local", mark + Duration::minutes(5));
        assert_eq!(
            classify(Some(&rec), "remote", Some(mark)),
            Some(ChangeStatus::Conflict)
        );
    }

    #[test]
    fn local_edit_before_watermark_is_modified() {
        let mark = Utc::now();
        let rec = record("local", mark - Duration::minutes(5));
        assert_eq!(
            classify(Some(&rec), "remote", Some(mark)),
            Some(ChangeStatus::Modified)
        );
    }

    #[test]
    fn updated_exactly_at_watermark_is_modified() {
        // strict comparison: equal timestamps do not conflict
        let mark = Utc::now();
        let rec = record("local", mark);
        assert_eq!(
            classify(Some(&rec), "remote", Some(mark)),
            Some(ChangeStatus::Modified)
        );
    }

    #[test]
    fn missing_watermark_never_conflicts() {
        let rec = record("local", Utc::now());
        assert_eq!(classify(Some(&rec), "remote", None), Some(ChangeStatus::Modified));
    }
}
