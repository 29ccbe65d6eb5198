//! File download service — streams blob content for active files.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

use depot_core::error::AppError;
use depot_core::result::AppResult;
use depot_core::traits::authorization::{Action, Authorizer};
use depot_core::traits::object_store::ObjectStore;
use depot_database::repositories::file::FileRepository;
use depot_entity::file::File;
use depot_storage::bucket;

use crate::context::RequestContext;
use crate::tenant::TenantService;

/// Result containing file metadata and content bytes for a download.
#[derive(Debug)]
pub struct DownloadResult {
    /// File metadata.
    pub file: File,
    /// File content bytes.
    pub data: Bytes,
    /// MIME type for the Content-Type header.
    pub content_type: String,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
}

/// Handles file downloads.
#[derive(Clone)]
pub struct DownloadService {
    file_repo: Arc<FileRepository>,
    tenant: Arc<TenantService>,
    store: Arc<dyn ObjectStore>,
    authorizer: Arc<dyn Authorizer>,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        tenant: Arc<TenantService>,
        store: Arc<dyn ObjectStore>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            file_repo,
            tenant,
            store,
            authorizer,
        }
    }

    /// Download the current version of a file.
    pub async fn download(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<DownloadResult> {
        let (file, bucket_name, hash) = self.resolve_active(ctx, file_id).await?;

        let data = self.store.get(&bucket_name, &bucket::blob_key(&hash)).await?;

        Ok(DownloadResult {
            filename: file.name.clone(),
            content_type: content_type_of(&file),
            file,
            data,
        })
    }

    /// Download a specific historical version of a file.
    pub async fn download_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<DownloadResult> {
        let (file, bucket_name, _) = self.resolve_active(ctx, file_id).await?;

        let version = self
            .file_repo
            .find_version(file_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_number} not found"))
            })?;

        let data = self
            .store
            .get(&bucket_name, &bucket::blob_key(&version.content_hash))
            .await?;

        Ok(DownloadResult {
            filename: file.name.clone(),
            content_type: content_type_of(&file),
            file,
            data,
        })
    }

    /// Presigned download URL for the current version, valid for `ttl`.
    pub async fn download_url(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        ttl: Duration,
    ) -> AppResult<String> {
        let (_, bucket_name, hash) = self.resolve_active(ctx, file_id).await?;
        self.store
            .presigned_url(&bucket_name, &bucket::blob_key(&hash), ttl)
            .await
    }

    /// Look up an active, non-folder file and resolve its bucket and hash.
    async fn resolve_active(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> AppResult<(File, String, String)> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| AppError::not_found("File not found"))?;

        if file.is_folder {
            return Err(AppError::validation("Folders cannot be downloaded"));
        }

        let project = self.tenant.resolve_project(file.project_id).await?;
        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Read)
            .await?;

        let hash = file
            .content_hash
            .clone()
            .ok_or_else(|| AppError::invariant("Non-folder file without content hash"))?;

        Ok((file, self.tenant.bucket_for(&project), hash))
    }
}

fn content_type_of(file: &File) -> String {
    file.mime_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string())
}
