//! Storage accounting aggregator.
//!
//! Maintains the per-project, per-day usage rows incrementally and
//! reconciles them against ground truth on demand. Accounting is advisory:
//! upload/delete/restore trigger it fire-and-forget, and a failed update
//! is logged, never surfaced to the triggering operation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use depot_core::result::AppResult;
use depot_database::repositories::file::FileRepository;
use depot_database::repositories::stat::StatRepository;
use depot_entity::storage::stat::day_increase;
use depot_entity::storage::{StatDelta, StorageStat};

/// Maintains and reconciles storage statistics.
#[derive(Debug, Clone)]
pub struct AccountingService {
    stat_repo: Arc<StatRepository>,
    file_repo: Arc<FileRepository>,
}

impl AccountingService {
    /// Creates a new accounting service.
    pub fn new(stat_repo: Arc<StatRepository>, file_repo: Arc<FileRepository>) -> Self {
        Self {
            stat_repo,
            file_repo,
        }
    }

    /// Apply a usage delta to today's row for a project.
    ///
    /// The fast path is a single atomic increment. When today has no row
    /// yet, ground truth (which already includes the triggering change,
    /// since the caller committed first) becomes the baseline and the
    /// delta is recorded as the day's change.
    pub async fn apply_delta(&self, project_id: Uuid, delta: StatDelta) -> AppResult<()> {
        let today = Utc::now().date_naive();

        if self.stat_repo.increment(project_id, today, &delta).await? {
            return Ok(());
        }

        let (file_count, total_size) = self.file_repo.project_totals(project_id).await?;
        self.stat_repo
            .insert_baseline(project_id, today, file_count, total_size, &delta)
            .await
    }

    /// Trigger `apply_delta` without waiting for it.
    ///
    /// The caller's operation has already committed; an accounting failure
    /// here leaves a reconcilable gap, nothing more.
    pub fn spawn_delta(&self, project_id: Uuid, delta: StatDelta) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.apply_delta(project_id, delta).await {
                warn!(
                    project_id = %project_id,
                    error = %e,
                    "Storage accounting update failed; row will be fixed by recompute"
                );
            }
        });
    }

    /// Rebuild today's row for a project from ground truth.
    ///
    /// The day's increase is derived as `max(0, today - yesterday)` so a
    /// correction never records a negative daily delta. Externally
    /// triggered; there is no resident scheduler in this engine.
    pub async fn recompute(&self, project_id: Uuid) -> AppResult<StorageStat> {
        let today = Utc::now().date_naive();

        let (file_count, total_size) = self.file_repo.project_totals(project_id).await?;
        let yesterday_total = self
            .stat_repo
            .find_latest_before(project_id, today)
            .await?
            .map(|row| row.total_size)
            .unwrap_or(0);

        let size_delta = day_increase(total_size, yesterday_total);
        let row = self
            .stat_repo
            .upsert_exact(project_id, today, file_count, total_size, size_delta)
            .await?;

        info!(
            project_id = %project_id,
            file_count,
            total_size,
            size_delta,
            "Recomputed storage statistics"
        );
        Ok(row)
    }
}
