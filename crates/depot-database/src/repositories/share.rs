//! Share repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::types::pagination::{PageRequest, PageResponse};
use depot_entity::share::{CreateShare, FileShare};

/// Outcome of inserting a share row.
#[derive(Debug)]
pub enum ShareInsert {
    /// The row was created.
    Created(FileShare),
    /// The generated code collided with an existing one.
    CodeTaken,
}

/// Repository for share CRUD, code lookup, and the counted-download guard.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a share by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileShare>> {
        sqlx::query_as::<_, FileShare>("SELECT * FROM file_shares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    /// Find a share by its code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<FileShare>> {
        sqlx::query_as::<_, FileShare>("SELECT * FROM file_shares WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find share by code", e)
            })
    }

    /// List shares created by a user.
    pub async fn find_by_creator(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileShare>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM file_shares WHERE created_by = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count shares", e)
                })?;

        let shares = sqlx::query_as::<_, FileShare>(
            "SELECT * FROM file_shares WHERE created_by = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shares", e))?;

        Ok(PageResponse::new(
            shares,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Insert a share row, reporting a code collision instead of erroring
    /// so the caller can retry with a fresh code.
    pub async fn create(&self, data: &CreateShare) -> AppResult<ShareInsert> {
        let result = sqlx::query_as::<_, FileShare>(
            "INSERT INTO file_shares (file_id, code, password_hash, expires_at, \
             download_limit, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.file_id)
        .bind(&data.code)
        .bind(&data.password_hash)
        .bind(data.expires_at)
        .bind(data.download_limit)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(share) => Ok(ShareInsert::Created(share)),
            Err(e) if is_unique_violation(&e) => Ok(ShareInsert::CodeTaken),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to create share",
                e,
            )),
        }
    }

    /// Count a download against the share's limit in one atomic statement.
    ///
    /// The guard re-checks exhaustion at the store level, so two accessors
    /// racing for the last download cannot both pass. Returns the new
    /// count, or `None` when the limit was already reached.
    pub async fn increment_download_count(&self, share_id: Uuid) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE file_shares SET download_count = download_count + 1, last_accessed = NOW() \
             WHERE id = $1 AND (download_limit = 0 OR download_count < download_limit) \
             RETURNING download_count",
        )
        .bind(share_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count download", e)
        })
    }

    /// Record the last access time.
    pub async fn update_last_accessed(
        &self,
        share_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE file_shares SET last_accessed = $2 WHERE id = $1")
            .bind(share_id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last access", e)
            })?;
        Ok(())
    }

    /// Deactivate a share. Cancelled shares stay in the table.
    pub async fn deactivate(&self, share_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE file_shares SET is_active = FALSE WHERE id = $1")
            .bind(share_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to deactivate share", e)
            })?;
        Ok(())
    }
}

/// Whether a sqlx error is a unique-constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
