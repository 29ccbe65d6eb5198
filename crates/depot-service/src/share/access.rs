//! Public share access — validation chain and counted downloads.
//!
//! Checks fail closed and in order: file not soft-deleted, share active
//! and not expired, download budget left, password match. The counter is
//! only moved by a guarded atomic update, so racing accessors cannot
//! overshoot the limit.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use depot_core::error::AppError;
use depot_core::result::AppResult;
use depot_core::traits::object_store::ObjectStore;
use depot_database::repositories::file::FileRepository;
use depot_database::repositories::share::ShareRepository;
use depot_entity::share::{FileShare, ShareValidity};
use depot_storage::bucket;

use super::password::SharePasswordHasher;
use crate::tenant::TenantService;

/// A download served through a share link.
#[derive(Debug)]
pub struct ShareDownload {
    /// File name for Content-Disposition.
    pub filename: String,
    /// MIME type for Content-Type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// File content.
    pub data: Bytes,
    /// Download count after this access.
    pub download_count: i32,
}

/// Validates share codes and serves share downloads. No authenticated
/// context is involved; the code is the credential.
#[derive(Clone)]
pub struct ShareAccessService {
    share_repo: Arc<ShareRepository>,
    file_repo: Arc<FileRepository>,
    tenant: Arc<TenantService>,
    store: Arc<dyn ObjectStore>,
    hasher: Arc<SharePasswordHasher>,
}

impl std::fmt::Debug for ShareAccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareAccessService").finish()
    }
}

impl ShareAccessService {
    /// Creates a new share access service.
    pub fn new(
        share_repo: Arc<ShareRepository>,
        file_repo: Arc<FileRepository>,
        tenant: Arc<TenantService>,
        store: Arc<dyn ObjectStore>,
        hasher: Arc<SharePasswordHasher>,
    ) -> Self {
        Self {
            share_repo,
            file_repo,
            tenant,
            store,
            hasher,
        }
    }

    /// Validate a share code without consuming a download. Returns the
    /// share for metadata display (password not yet verified).
    pub async fn inspect(&self, code: &str) -> AppResult<FileShare> {
        let (share, _) = self.validate_code(code).await?;

        // Best effort; inspection is read-only from the caller's view.
        let _ = self
            .share_repo
            .update_last_accessed(share.id, chrono::Utc::now())
            .await;

        Ok(share)
    }

    /// Access a share: run the validation chain, count the download, and
    /// stream the blob from the tenant namespace.
    pub async fn access(&self, code: &str, password: Option<&str>) -> AppResult<ShareDownload> {
        let (share, file) = self.validate_code(code).await?;

        if let Some(hash) = &share.password_hash {
            let supplied =
                password.ok_or_else(|| AppError::credential("Share password required"))?;
            if !self.hasher.verify_password(supplied, hash)? {
                return Err(AppError::credential("Share password does not match"));
            }
        }

        // The guard re-checks the limit; a concurrent accessor taking the
        // last download makes this fail closed.
        let download_count = self
            .share_repo
            .increment_download_count(share.id)
            .await?
            .ok_or_else(|| {
                AppError::expired_or_exhausted("Share has reached its download limit")
            })?;

        let project = self.tenant.resolve_project(file.project_id).await?;
        let bucket_name = self.tenant.bucket_for(&project);
        let hash = file
            .content_hash
            .as_deref()
            .ok_or_else(|| AppError::invariant("Shared file without content hash"))?;

        let data = self.store.get(&bucket_name, &bucket::blob_key(hash)).await?;

        info!(
            share_id = %share.id,
            file_id = %file.id,
            download_count,
            "Share download served"
        );

        Ok(ShareDownload {
            filename: file.name.clone(),
            content_type: file
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            size_bytes: file.size_bytes,
            data,
            download_count,
        })
    }

    /// Shared validation chain for both inspection and access.
    async fn validate_code(
        &self,
        code: &str,
    ) -> AppResult<(FileShare, depot_entity::file::File)> {
        let share = self
            .share_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Invalid share code"))?;

        let file = self
            .file_repo
            .find_by_id(share.file_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| AppError::not_found("The shared file is no longer available"))?;

        match share.validity(chrono::Utc::now()) {
            ShareValidity::Valid => Ok((share, file)),
            ShareValidity::Cancelled => Err(AppError::not_found("Share has been cancelled")),
            ShareValidity::Expired => Err(AppError::expired_or_exhausted("Share has expired")),
            ShareValidity::Exhausted => Err(AppError::expired_or_exhausted(
                "Share has reached its download limit",
            )),
        }
    }
}
