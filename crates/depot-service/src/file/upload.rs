//! Upload transaction coordinator.
//!
//! Keeps the metadata store and the object store coherent for uploads:
//! metadata (File + FileVersion) is written inside one transaction, the
//! blob is transferred before commit unless deduplication skips it, and a
//! transfer failure rolls the transaction back. A blob orphaned by a
//! commit failure after transfer is an accepted minor leak, swept by
//! reconciliation rather than compensated inline.

use std::sync::Arc;

use bytes::Bytes;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use depot_core::config::storage::StorageConfig;
use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::authorization::{Action, Authorizer};
use depot_core::traits::object_store::ObjectStore;
use depot_database::repositories::file::FileRepository;
use depot_entity::file::{CreateFile, CreateVersion, File};
use depot_entity::storage::StatDelta;
use depot_storage::bucket;

use crate::content::{self, ContentAddressor};
use crate::context::RequestContext;
use crate::path;
use crate::stats::AccountingService;
use crate::tenant::TenantService;

/// Parameters for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target project.
    pub project_id: Uuid,
    /// Target logical folder path.
    pub folder_path: String,
    /// File name.
    pub file_name: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

/// Coordinates upload transactions across the metadata and object stores.
#[derive(Clone)]
pub struct UploadService {
    /// Database pool; transactions are begun here.
    pool: PgPool,
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Tenant namespace resolution.
    tenant: Arc<TenantService>,
    /// Deduplication lookup.
    addressor: ContentAddressor,
    /// Object store.
    store: Arc<dyn ObjectStore>,
    /// Permission gate.
    authorizer: Arc<dyn Authorizer>,
    /// Accounting trigger.
    accounting: Arc<AccountingService>,
    /// Storage configuration.
    config: StorageConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService").finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        file_repo: Arc<FileRepository>,
        tenant: Arc<TenantService>,
        store: Arc<dyn ObjectStore>,
        authorizer: Arc<dyn Authorizer>,
        accounting: Arc<AccountingService>,
        config: StorageConfig,
    ) -> Self {
        let addressor = ContentAddressor::new(file_repo.clone());
        Self {
            pool,
            file_repo,
            tenant,
            addressor,
            store,
            authorizer,
            accounting,
            config,
        }
    }

    /// Upload file content to a logical path.
    ///
    /// Creates the file at version 1, or advances an existing file's head
    /// by exactly one version. Identical content already present in the
    /// tenant namespace is not transferred again.
    pub async fn upload(&self, ctx: &RequestContext, req: UploadRequest) -> AppResult<File> {
        if req.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let project = self.tenant.resolve_project(req.project_id).await?;
        self.authorizer
            .require(ctx.user_id, &project.group_key, project.id, Action::Write)
            .await?;

        let folder_path = path::normalize_folder_path(&req.folder_path)?;
        path::validate_name(&req.file_name)?;

        let size_bytes = req.data.len() as i64;
        let hash = content::content_hash(&req.data);
        let bucket_name = self.tenant.ensure_bucket_for(&project).await?;

        let existing = self
            .file_repo
            .find_by_location(project.id, &folder_path, &req.file_name)
            .await?;

        if existing.as_ref().is_some_and(|f| f.is_folder) {
            return Err(AppError::conflict(format!(
                "A folder occupies {}",
                path::full_path(&folder_path, &req.file_name)
            )));
        }

        // Dedup decision comes from metadata, never from the object store.
        let already_stored = self.addressor.is_stored(&project.group_key, &hash).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let (file, delta) = match existing {
            None => {
                let created = self
                    .file_repo
                    .create_tx(
                        &mut tx,
                        &CreateFile {
                            project_id: project.id,
                            folder_path: folder_path.clone(),
                            name: req.file_name.clone(),
                            content_hash: Some(hash.clone()),
                            size_bytes,
                            mime_type: req.mime_type.clone(),
                            is_folder: false,
                            current_version: 1,
                            uploaded_by: ctx.user_id,
                        },
                    )
                    .await?;

                self.file_repo
                    .create_version_tx(
                        &mut tx,
                        &CreateVersion {
                            file_id: created.id,
                            version_number: 1,
                            content_hash: hash.clone(),
                            size_bytes,
                            uploaded_by: ctx.user_id,
                            comment: None,
                        },
                    )
                    .await?;

                (created, StatDelta::added(size_bytes))
            }
            Some(current) => {
                let updated = self
                    .file_repo
                    .advance_head_tx(
                        &mut tx,
                        current.id,
                        current.current_version,
                        &hash,
                        size_bytes,
                        req.mime_type.as_deref(),
                        ctx.user_id,
                    )
                    .await?
                    .ok_or_else(|| {
                        AppError::conflict("File was modified concurrently; retry the upload")
                    })?;

                self.file_repo
                    .create_version_tx(
                        &mut tx,
                        &CreateVersion {
                            file_id: updated.id,
                            version_number: updated.current_version,
                            content_hash: hash.clone(),
                            size_bytes,
                            uploaded_by: ctx.user_id,
                            comment: None,
                        },
                    )
                    .await?;

                let delta = StatDelta::resized(current.size_bytes, size_bytes);
                (updated, delta)
            }
        };

        // Transfer before commit: a failed transfer drops the transaction
        // and no metadata survives pointing at missing bytes.
        if !already_stored {
            self.store
                .put(
                    &bucket_name,
                    &bucket::blob_key(&hash),
                    req.data.clone(),
                    req.mime_type.as_deref(),
                )
                .await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit upload", e)
        })?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            project_id = %project.id,
            name = %file.name,
            version = file.current_version,
            size = file.size_bytes,
            deduplicated = already_stored,
            "Upload completed"
        );

        self.accounting.spawn_delta(project.id, delta);

        Ok(file)
    }
}
