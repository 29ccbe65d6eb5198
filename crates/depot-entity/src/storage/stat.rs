//! Per-project, per-day storage usage statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per (project, calendar day) of storage accounting.
///
/// Advisory and eventually consistent: incrementally maintained after
/// uploads, deletes, and restores, and periodically reconciled against the
/// ground truth computed from active non-folder file rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StorageStat {
    /// Unique row identifier.
    pub id: Uuid,
    /// The project being accounted.
    pub project_id: Uuid,
    /// The calendar day this row covers.
    pub stat_date: NaiveDate,
    /// Current number of active, non-folder files.
    pub file_count: i64,
    /// Current total size of active, non-folder files in bytes.
    pub total_size: i64,
    /// Net size change recorded for this day.
    pub size_delta: i64,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A usage change to apply to a project's accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    /// Signed change in total size (bytes).
    pub size_delta: i64,
    /// Signed change in file count.
    pub count_delta: i64,
}

impl StatDelta {
    /// Delta for a newly uploaded file.
    pub fn added(size_bytes: i64) -> Self {
        Self {
            size_delta: size_bytes,
            count_delta: 1,
        }
    }

    /// Delta for a removed (deleted) file.
    pub fn removed(size_bytes: i64) -> Self {
        Self {
            size_delta: -size_bytes,
            count_delta: -1,
        }
    }

    /// Delta for a re-upload that replaced the current version in place.
    pub fn resized(old_size: i64, new_size: i64) -> Self {
        Self {
            size_delta: new_size - old_size,
            count_delta: 0,
        }
    }
}

/// Day-over-day increase rule used by reconciliation: corrections must not
/// produce a negative daily delta.
pub fn day_increase(today_total: i64, yesterday_total: i64) -> i64 {
    (today_total - yesterday_total).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_carry_sign_and_count() {
        assert_eq!(StatDelta::added(100).size_delta, 100);
        assert_eq!(StatDelta::added(100).count_delta, 1);
        assert_eq!(StatDelta::removed(100).size_delta, -100);
        assert_eq!(StatDelta::removed(100).count_delta, -1);
        assert_eq!(StatDelta::resized(100, 40).size_delta, -60);
        assert_eq!(StatDelta::resized(100, 40).count_delta, 0);
    }

    #[test]
    fn day_increase_never_negative() {
        assert_eq!(day_increase(500, 200), 300);
        assert_eq!(day_increase(200, 500), 0);
        assert_eq!(day_increase(0, 0), 0);
    }
}
