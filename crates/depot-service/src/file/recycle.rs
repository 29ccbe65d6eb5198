//! Soft-delete / recycle manager.
//!
//! Entries move between two states, Active and Deleted, via guarded
//! single-row flips; both directions reject when the entry is already in
//! the target state. Permanent deletion bypasses the state machine and is
//! the only path that destroys metadata — and blobs, once the last
//! reference to a hash in the tenant namespace is gone.

use std::collections::HashSet;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::authorization::{Action, Authorizer};
use depot_core::traits::object_store::ObjectStore;
use depot_core::types::pagination::{PageRequest, PageResponse};
use depot_database::repositories::file::FileRepository;
use depot_entity::file::File;
use depot_entity::storage::StatDelta;
use depot_storage::bucket;

use crate::context::RequestContext;
use crate::stats::AccountingService;
use crate::tenant::TenantService;

/// Manages the recycle state machine and permanent deletion.
#[derive(Clone)]
pub struct RecycleService {
    pool: PgPool,
    file_repo: Arc<FileRepository>,
    tenant: Arc<TenantService>,
    store: Arc<dyn ObjectStore>,
    authorizer: Arc<dyn Authorizer>,
    accounting: Arc<AccountingService>,
}

impl std::fmt::Debug for RecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecycleService").finish()
    }
}

impl RecycleService {
    /// Creates a new recycle service.
    pub fn new(
        pool: PgPool,
        file_repo: Arc<FileRepository>,
        tenant: Arc<TenantService>,
        store: Arc<dyn ObjectStore>,
        authorizer: Arc<dyn Authorizer>,
        accounting: Arc<AccountingService>,
    ) -> Self {
        Self {
            pool,
            file_repo,
            tenant,
            store,
            authorizer,
            accounting,
        }
    }

    /// Move an active entry to the recycle state.
    pub async fn delete(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = self.require_file(file_id).await?;
        let project = self.tenant.resolve_project(file.project_id).await?;

        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Delete)
            .await?;

        if !self.file_repo.soft_delete(file.id, ctx.user_id).await? {
            return Err(AppError::conflict("Entry is already in the recycle state"));
        }

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            path = %file.full_path(),
            "Entry moved to recycle"
        );

        if !file.is_folder {
            self.accounting
                .spawn_delta(project.id, StatDelta::removed(file.size_bytes));
        }
        Ok(())
    }

    /// Restore a recycled entry to the active state.
    ///
    /// Hash, size, and version come back exactly as they were; only the
    /// deletion metadata is cleared.
    pub async fn restore(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = self.require_file(file_id).await?;
        let project = self.tenant.resolve_project(file.project_id).await?;

        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Delete)
            .await?;

        if !self.file_repo.restore(file.id).await? {
            return Err(AppError::conflict("Entry is not in the recycle state"));
        }

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            path = %file.full_path(),
            "Entry restored from recycle"
        );

        if !file.is_folder {
            self.accounting
                .spawn_delta(project.id, StatDelta::added(file.size_bytes));
        }
        Ok(())
    }

    /// Permanently destroy an entry, its versions, and — when nothing else
    /// in the tenant namespace references them — its blobs.
    pub async fn purge(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = self.require_file(file_id).await?;
        let project = self.tenant.resolve_project(file.project_id).await?;

        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Delete)
            .await?;

        // Hashes this entry contributed; checked for liveness after the
        // metadata is gone.
        let mut hashes: HashSet<String> = HashSet::new();
        if let Some(hash) = &file.content_hash {
            hashes.insert(hash.clone());
        }
        for version in self.file_repo.find_versions(file.id).await? {
            hashes.insert(version.content_hash);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        self.file_repo.purge_tx(&mut tx, file.id).await?;
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit purge", e)
        })?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            path = %file.full_path(),
            "Entry permanently deleted"
        );

        // Blob cleanup is best effort after commit; a leaked blob is
        // recoverable by reconciliation, a dangling reference is not.
        let bucket_name = self.tenant.bucket_for(&project);
        for hash in hashes {
            match self
                .file_repo
                .hash_referenced_in_group(&project.group_key, &hash)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    if let Err(e) = self
                        .store
                        .delete(&bucket_name, &bucket::blob_key(&hash))
                        .await
                    {
                        warn!(hash = %hash, error = %e, "Failed to delete unreferenced blob");
                    }
                }
                Err(e) => {
                    warn!(hash = %hash, error = %e, "Failed to check blob references");
                }
            }
        }

        if !file.is_folder && !file.is_deleted() {
            self.accounting
                .spawn_delta(project.id, StatDelta::removed(file.size_bytes));
        }
        Ok(())
    }

    /// List the recycled entries of a project, most recently deleted first.
    pub async fn list_deleted(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let project = self.tenant.resolve_project(project_id).await?;
        self.authorizer
            .require(ctx.user_id, &project.group_key, project.id, Action::Read)
            .await?;

        self.file_repo.find_deleted_by_project(project.id, &page).await
    }

    async fn require_file(&self, file_id: Uuid) -> AppResult<File> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }
}
