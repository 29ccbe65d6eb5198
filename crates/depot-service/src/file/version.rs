//! Version chain service — list, inspect, and revert versions.
//!
//! The version chain is append-only: strictly increasing numbers starting
//! at 1, never reused, never mutated. Reverting copies a historical
//! version forward as a new head version instead of rewriting history.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::authorization::{Action, Authorizer};
use depot_database::repositories::file::FileRepository;
use depot_entity::file::{CreateVersion, File, FileVersion};
use depot_entity::storage::StatDelta;

use crate::context::RequestContext;
use crate::stats::AccountingService;
use crate::tenant::TenantService;

/// Manages file version history.
#[derive(Clone)]
pub struct VersionService {
    pool: PgPool,
    file_repo: Arc<FileRepository>,
    tenant: Arc<TenantService>,
    authorizer: Arc<dyn Authorizer>,
    accounting: Arc<AccountingService>,
}

impl std::fmt::Debug for VersionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionService").finish()
    }
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        pool: PgPool,
        file_repo: Arc<FileRepository>,
        tenant: Arc<TenantService>,
        authorizer: Arc<dyn Authorizer>,
        accounting: Arc<AccountingService>,
    ) -> Self {
        Self {
            pool,
            file_repo,
            tenant,
            authorizer,
            accounting,
        }
    }

    /// Lists all versions of a file, newest first.
    ///
    /// Versions stay retrievable even while the file sits in the recycle
    /// state.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> AppResult<Vec<FileVersion>> {
        let file = self.require_file(file_id).await?;
        let project = self.tenant.resolve_project(file.project_id).await?;

        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Read)
            .await?;

        self.file_repo.find_versions(file_id).await
    }

    /// Fetch a single version of a file.
    pub async fn get_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<FileVersion> {
        let file = self.require_file(file_id).await?;
        let project = self.tenant.resolve_project(file.project_id).await?;

        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Read)
            .await?;

        self.file_repo
            .find_version(file_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_number} not found"))
            })
    }

    /// Revert a file to a historical version by copying it forward.
    ///
    /// Mints a new version whose hash/size copy the target; the target and
    /// everything between it and the old head remain untouched. No blob is
    /// transferred — the content is already referenced in the tenant
    /// namespace.
    pub async fn revert_to_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<File> {
        let file = self.require_file(file_id).await?;
        if file.is_deleted() {
            return Err(AppError::not_found("File is in the recycle state"));
        }
        if file.is_folder {
            return Err(AppError::validation("Folders have no versions"));
        }

        let project = self.tenant.resolve_project(file.project_id).await?;
        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Write)
            .await?;

        let target = self
            .file_repo
            .find_version(file_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_number} not found"))
            })?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let updated = self
            .file_repo
            .advance_head_tx(
                &mut tx,
                file.id,
                file.current_version,
                &target.content_hash,
                target.size_bytes,
                None,
                ctx.user_id,
            )
            .await?
            .ok_or_else(|| {
                AppError::conflict("File was modified concurrently; retry the revert")
            })?;

        self.file_repo
            .create_version_tx(
                &mut tx,
                &CreateVersion {
                    file_id: updated.id,
                    version_number: updated.current_version,
                    content_hash: target.content_hash.clone(),
                    size_bytes: target.size_bytes,
                    uploaded_by: ctx.user_id,
                    comment: Some(format!("Reverted to version {version_number}")),
                },
            )
            .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit revert", e)
        })?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            from_version = file.current_version,
            to_version = updated.current_version,
            source_version = version_number,
            "File reverted"
        );

        self.accounting.spawn_delta(
            project.id,
            StatDelta::resized(file.size_bytes, target.size_bytes),
        );

        Ok(updated)
    }

    async fn require_file(&self, file_id: Uuid) -> AppResult<File> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }
}
