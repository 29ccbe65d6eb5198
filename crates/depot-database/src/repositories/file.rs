//! File repository implementation.
//!
//! Holds the guarded statements the consistency engine relies on: the
//! partial unique index on `(project_id, folder_path, name)` decides
//! concurrent-create races, the `current_version = $expected` guard decides
//! concurrent re-upload races, and soft-delete/restore are single guarded
//! updates rather than read-then-write flips.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::types::pagination::{PageRequest, PageResponse};
use depot_entity::file::{CreateFile, CreateVersion, File, FileVersion};

/// Repository for file, folder, and version rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an entry by ID, deleted or not.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    /// Find the non-deleted occupant of a logical path, if any.
    pub async fn find_by_location(
        &self,
        project_id: Uuid,
        folder_path: &str,
        name: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE project_id = $1 AND folder_path = $2 AND name = $3 AND NOT is_deleted",
        )
        .bind(project_id)
        .bind(folder_path)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find file by location", e)
        })
    }

    /// List non-deleted entries in a folder with pagination, folders first.
    pub async fn find_by_folder(
        &self,
        project_id: Uuid,
        folder_path: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files \
             WHERE project_id = $1 AND folder_path = $2 AND NOT is_deleted",
        )
        .bind(project_id)
        .bind(folder_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;

        let files = sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE project_id = $1 AND folder_path = $2 AND NOT is_deleted \
             ORDER BY is_folder DESC, name ASC LIMIT $3 OFFSET $4",
        )
        .bind(project_id)
        .bind(folder_path)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))?;

        Ok(PageResponse::new(
            files,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List deleted entries of a project (the recycle view).
    pub async fn find_deleted_by_project(
        &self,
        project_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE project_id = $1 AND is_deleted",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count deleted files", e)
        })?;

        let files = sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE project_id = $1 AND is_deleted \
             ORDER BY deleted_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(project_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list deleted files", e)
        })?;

        Ok(PageResponse::new(
            files,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Insert a new entry inside a transaction.
    ///
    /// A concurrent creator racing for the same path loses here: the
    /// partial unique index rejects the second insert and the violation is
    /// surfaced as `Conflict`.
    pub async fn create_tx(&self, conn: &mut PgConnection, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (project_id, folder_path, name, content_hash, size_bytes, \
             mime_type, is_folder, current_version, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.project_id)
        .bind(&data.folder_path)
        .bind(&data.name)
        .bind(&data.content_hash)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(data.is_folder)
        .bind(data.current_version)
        .bind(data.uploaded_by)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!(
                    "An entry named '{}' already exists at {}",
                    data.name, data.folder_path
                ))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create file", e)
            }
        })
    }

    /// Move a file's head to the next version with an optimistic guard.
    ///
    /// Returns `None` when `expected_version` no longer matches, meaning a
    /// concurrent writer won the version race.
    pub async fn advance_head_tx(
        &self,
        conn: &mut PgConnection,
        file_id: Uuid,
        expected_version: i32,
        content_hash: &str,
        size_bytes: i64,
        mime_type: Option<&str>,
        uploaded_by: Uuid,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET content_hash = $3, size_bytes = $4, \
             mime_type = COALESCE($5, mime_type), current_version = current_version + 1, \
             uploaded_by = $6, updated_at = NOW() \
             WHERE id = $1 AND current_version = $2 AND NOT is_deleted \
             RETURNING *",
        )
        .bind(file_id)
        .bind(expected_version)
        .bind(content_hash)
        .bind(size_bytes)
        .bind(mime_type)
        .bind(uploaded_by)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to advance version", e))
    }

    /// Record a version row inside a transaction.
    pub async fn create_version_tx(
        &self,
        conn: &mut PgConnection,
        data: &CreateVersion,
    ) -> AppResult<FileVersion> {
        sqlx::query_as::<_, FileVersion>(
            "INSERT INTO file_versions (file_id, version_number, content_hash, size_bytes, \
             uploaded_by, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.file_id)
        .bind(data.version_number)
        .bind(&data.content_hash)
        .bind(data.size_bytes)
        .bind(data.uploaded_by)
        .bind(&data.comment)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!(
                    "Version {} already recorded for file {}",
                    data.version_number, data.file_id
                ))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create version", e)
            }
        })
    }

    /// List all versions of a file, newest first.
    pub async fn find_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY version_number DESC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    /// Find a single version of a file.
    pub async fn find_version(
        &self,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    /// Whether any file or version in the group references a content hash.
    ///
    /// Scoped to the tenant namespace: blob keys are content-addressed
    /// within the group's bucket, so this answers "are the bytes already
    /// present there".
    pub async fn hash_referenced_in_group(
        &self,
        group_key: &str,
        content_hash: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
             SELECT 1 FROM files f \
               JOIN projects p ON p.id = f.project_id \
              WHERE p.group_key = $1 AND f.content_hash = $2 \
             UNION ALL \
             SELECT 1 FROM file_versions v \
               JOIN files f ON f.id = v.file_id \
               JOIN projects p ON p.id = f.project_id \
              WHERE p.group_key = $1 AND v.content_hash = $2)",
        )
        .bind(group_key)
        .bind(content_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check hash references", e)
        })
    }

    /// Ground-truth accounting for a project: count and total size over
    /// active, non-folder files.
    pub async fn project_totals(&self, project_id: Uuid) -> AppResult<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(size_bytes), 0)::BIGINT FROM files \
             WHERE project_id = $1 AND NOT is_deleted AND NOT is_folder",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute project totals", e)
        })
    }

    /// Flip an active entry to deleted. Returns `false` when the entry was
    /// already deleted (the guard lost).
    pub async fn soft_delete(&self, file_id: Uuid, deleted_by: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET is_deleted = TRUE, deleted_at = NOW(), deleted_by = $2, \
             updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(file_id)
        .bind(deleted_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to soft-delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip a deleted entry back to active. Returns `false` when the entry
    /// was not deleted.
    ///
    /// The restored path may have been taken by a newer entry in the
    /// meantime; the partial unique index rejects that restore, surfaced
    /// as `Conflict`.
    pub async fn restore(&self, file_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET is_deleted = FALSE, deleted_at = NULL, deleted_by = NULL, \
             updated_at = NOW() \
             WHERE id = $1 AND is_deleted",
        )
        .bind(file_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("The original path is occupied by another entry")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to restore file", e)
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently remove an entry. Version and share rows cascade.
    pub async fn purge_tx(&self, conn: &mut PgConnection, file_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge file", e))?;
        Ok(())
    }
}

/// Whether a sqlx error is a unique-constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
