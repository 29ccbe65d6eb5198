//! Storage statistics repository implementation.
//!
//! All increments happen at the store level; there is no read-then-write
//! path for counters anywhere in this module.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_entity::storage::{StatDelta, StorageStat};

/// Repository for per-project, per-day storage statistics.
#[derive(Debug, Clone)]
pub struct StatRepository {
    pool: PgPool,
}

impl StatRepository {
    /// Create a new stat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the stat row for a project and day.
    pub async fn find(&self, project_id: Uuid, day: NaiveDate) -> AppResult<Option<StorageStat>> {
        sqlx::query_as::<_, StorageStat>(
            "SELECT * FROM storage_stats WHERE project_id = $1 AND stat_date = $2",
        )
        .bind(project_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find stat row", e))
    }

    /// Find the most recent stat row before `day`.
    pub async fn find_latest_before(
        &self,
        project_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Option<StorageStat>> {
        sqlx::query_as::<_, StorageStat>(
            "SELECT * FROM storage_stats WHERE project_id = $1 AND stat_date < $2 \
             ORDER BY stat_date DESC LIMIT 1",
        )
        .bind(project_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find previous stat row", e)
        })
    }

    /// Apply a delta to an existing day row as an atomic increment.
    ///
    /// Returns `false` when no row exists yet for that day.
    pub async fn increment(
        &self,
        project_id: Uuid,
        day: NaiveDate,
        delta: &StatDelta,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE storage_stats SET file_count = file_count + $3, \
             total_size = total_size + $4, size_delta = size_delta + $4, updated_at = NOW() \
             WHERE project_id = $1 AND stat_date = $2",
        )
        .bind(project_id)
        .bind(day)
        .bind(delta.count_delta)
        .bind(delta.size_delta)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to increment stats", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a freshly computed baseline for a day, recording the
    /// triggering delta as that day's change.
    ///
    /// A concurrent baseline insert for the same day wins the unique
    /// constraint; the loser falls through to applying only its delta.
    pub async fn insert_baseline(
        &self,
        project_id: Uuid,
        day: NaiveDate,
        file_count: i64,
        total_size: i64,
        delta: &StatDelta,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO storage_stats (project_id, stat_date, file_count, total_size, size_delta) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (project_id, stat_date) DO UPDATE SET \
             file_count = storage_stats.file_count + $6, \
             total_size = storage_stats.total_size + $7, \
             size_delta = storage_stats.size_delta + $7, \
             updated_at = NOW()",
        )
        .bind(project_id)
        .bind(day)
        .bind(file_count)
        .bind(total_size)
        .bind(delta.size_delta)
        .bind(delta.count_delta)
        .bind(delta.size_delta)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert stat baseline", e)
        })?;
        Ok(())
    }

    /// Overwrite a day row with exact recomputed values.
    pub async fn upsert_exact(
        &self,
        project_id: Uuid,
        day: NaiveDate,
        file_count: i64,
        total_size: i64,
        size_delta: i64,
    ) -> AppResult<StorageStat> {
        sqlx::query_as::<_, StorageStat>(
            "INSERT INTO storage_stats (project_id, stat_date, file_count, total_size, size_delta) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (project_id, stat_date) DO UPDATE SET \
             file_count = EXCLUDED.file_count, total_size = EXCLUDED.total_size, \
             size_delta = EXCLUDED.size_delta, updated_at = NOW() \
             RETURNING *",
        )
        .bind(project_id)
        .bind(day)
        .bind(file_count)
        .bind(total_size)
        .bind(size_delta)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert stat row", e))
    }
}
