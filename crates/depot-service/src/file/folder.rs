//! Folder service — folder creation and folder listing.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::authorization::{Action, Authorizer};
use depot_core::types::pagination::{PageRequest, PageResponse};
use depot_database::repositories::file::FileRepository;
use depot_entity::file::{CreateFile, File};

use crate::context::RequestContext;
use crate::path;
use crate::tenant::TenantService;

/// Manages folder entries in the logical namespace.
#[derive(Clone)]
pub struct FolderService {
    pool: PgPool,
    file_repo: Arc<FileRepository>,
    tenant: Arc<TenantService>,
    authorizer: Arc<dyn Authorizer>,
}

impl std::fmt::Debug for FolderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderService").finish()
    }
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        pool: PgPool,
        file_repo: Arc<FileRepository>,
        tenant: Arc<TenantService>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            pool,
            file_repo,
            tenant,
            authorizer,
        }
    }

    /// Create a folder entry.
    ///
    /// Rejects with `Conflict` when a non-deleted entry already occupies
    /// the exact path; a concurrent creator racing for the same path is
    /// decided the same way by the unique index.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        parent_path: &str,
        name: &str,
    ) -> AppResult<File> {
        let project = self.tenant.resolve_project(project_id).await?;
        self.authorizer
            .require(ctx.user_id, &project.group_key, project.id, Action::Write)
            .await?;

        let parent_path = path::normalize_folder_path(parent_path)?;
        path::validate_name(name)?;

        if self
            .file_repo
            .find_by_location(project.id, &parent_path, name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "An entry already occupies {}",
                path::full_path(&parent_path, name)
            )));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let folder = self
            .file_repo
            .create_tx(
                &mut tx,
                &CreateFile {
                    project_id: project.id,
                    folder_path: parent_path.clone(),
                    name: name.to_string(),
                    content_hash: None,
                    size_bytes: 0,
                    mime_type: None,
                    is_folder: true,
                    current_version: 0,
                    uploaded_by: ctx.user_id,
                },
            )
            .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit folder creation", e)
        })?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            path = %folder.full_path(),
            "Folder created"
        );

        Ok(folder)
    }

    /// List the non-deleted entries of a folder, folders first.
    pub async fn list_folder(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        folder_path: &str,
        page: PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let project = self.tenant.resolve_project(project_id).await?;
        self.authorizer
            .require(ctx.user_id, &project.group_key, project.id, Action::Read)
            .await?;

        let folder_path = path::normalize_folder_path(folder_path)?;
        self.file_repo
            .find_by_folder(project.id, &folder_path, &page)
            .await
    }
}
