//! Share CRUD service — creation, listing, and cancellation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use depot_core::error::AppError;
use depot_core::result::AppResult;
use depot_core::traits::authorization::{Action, Authorizer};
use depot_core::types::pagination::{PageRequest, PageResponse};
use depot_database::repositories::file::FileRepository;
use depot_database::repositories::share::{ShareInsert, ShareRepository};
use depot_entity::share::{CreateShare, FileShare};

use super::code;
use super::password::SharePasswordHasher;
use crate::context::RequestContext;
use crate::tenant::TenantService;

/// Random-code attempts before falling back to a UUID-derived code.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Request to create a new share.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateShareRequest {
    /// The file to share.
    pub file_id: Uuid,
    /// Password protection (optional).
    pub password: Option<String>,
    /// Hours until expiry (None = never expires).
    pub expires_hours: Option<i64>,
    /// Maximum downloads (0 = unlimited).
    pub download_limit: i32,
}

/// Manages share creation, listing, and cancellation.
#[derive(Clone)]
pub struct ShareService {
    share_repo: Arc<ShareRepository>,
    file_repo: Arc<FileRepository>,
    tenant: Arc<TenantService>,
    authorizer: Arc<dyn Authorizer>,
    hasher: Arc<SharePasswordHasher>,
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService").finish()
    }
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        share_repo: Arc<ShareRepository>,
        file_repo: Arc<FileRepository>,
        tenant: Arc<TenantService>,
        authorizer: Arc<dyn Authorizer>,
        hasher: Arc<SharePasswordHasher>,
    ) -> Self {
        Self {
            share_repo,
            file_repo,
            tenant,
            authorizer,
            hasher,
        }
    }

    /// Creates a new share link for a file.
    pub async fn create_share(
        &self,
        ctx: &RequestContext,
        req: CreateShareRequest,
    ) -> AppResult<FileShare> {
        if req.download_limit < 0 {
            return Err(AppError::validation("Download limit must not be negative"));
        }
        if req.expires_hours.is_some_and(|h| h <= 0) {
            return Err(AppError::validation("Expiry must be in the future"));
        }

        let file = self
            .file_repo
            .find_by_id(req.file_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| AppError::not_found("File not found"))?;

        if file.is_folder {
            return Err(AppError::validation("Folders cannot be shared"));
        }

        let project = self.tenant.resolve_project(file.project_id).await?;
        self.authorizer
            .require(ctx.user_id, &project.group_key, file.id, Action::Share)
            .await?;

        let password_hash = match &req.password {
            Some(password) => Some(self.hasher.hash_password(password)?),
            None => None,
        };
        let expires_at = req.expires_hours.map(|h| Utc::now() + Duration::hours(h));

        let mut create = CreateShare {
            file_id: file.id,
            code: code::generate_code(),
            password_hash,
            expires_at,
            download_limit: req.download_limit,
            created_by: ctx.user_id,
        };

        // Retry on code collision; the uniqueness constraint is the judge.
        for attempt in 0..=MAX_CODE_ATTEMPTS {
            match self.share_repo.create(&create).await? {
                ShareInsert::Created(share) => {
                    info!(
                        user_id = %ctx.user_id,
                        share_id = %share.id,
                        file_id = %file.id,
                        code = %share.code,
                        "Share created"
                    );
                    return Ok(share);
                }
                ShareInsert::CodeTaken => {
                    create.code = if attempt < MAX_CODE_ATTEMPTS - 1 {
                        code::generate_code()
                    } else {
                        code::fallback_code()
                    };
                }
            }
        }

        Err(AppError::internal("Failed to allocate a unique share code"))
    }

    /// Lists shares created by the current user.
    pub async fn list_shares(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<FileShare>> {
        self.share_repo.find_by_creator(ctx.user_id, &page).await
    }

    /// Gets a share by ID (only the creator can view it).
    pub async fn get_share(&self, ctx: &RequestContext, share_id: Uuid) -> AppResult<FileShare> {
        let share = self
            .share_repo
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))?;

        if share.created_by != ctx.user_id {
            return Err(AppError::permission_denied(
                "You can only view your own shares",
            ));
        }
        Ok(share)
    }

    /// Cancels (deactivates) a share. The row is kept.
    pub async fn cancel_share(&self, ctx: &RequestContext, share_id: Uuid) -> AppResult<()> {
        let share = self.get_share(ctx, share_id).await?;

        self.share_repo.deactivate(share.id).await?;

        info!(
            user_id = %ctx.user_id,
            share_id = %share_id,
            "Share cancelled"
        );
        Ok(())
    }
}
