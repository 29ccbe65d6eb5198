//! Tenant namespace resolution.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use depot_core::error::AppError;
use depot_core::result::AppResult;
use depot_core::traits::object_store::ObjectStore;
use depot_database::repositories::project::ProjectRepository;
use depot_entity::project::Project;
use depot_storage::bucket;

/// Resolves projects to their tenant storage namespace.
#[derive(Clone)]
pub struct TenantService {
    project_repo: Arc<ProjectRepository>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for TenantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantService").finish()
    }
}

impl TenantService {
    /// Creates a new tenant service.
    pub fn new(project_repo: Arc<ProjectRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            project_repo,
            store,
        }
    }

    /// Resolve a project by id.
    pub async fn resolve_project(&self, project_id: Uuid) -> AppResult<Project> {
        self.project_repo
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))
    }

    /// The bucket name for a project's group. Pure derivation.
    pub fn bucket_for(&self, project: &Project) -> String {
        bucket::bucket_name(&project.group_key)
    }

    /// Resolve the bucket and make sure it exists. Idempotent.
    pub async fn ensure_bucket_for(&self, project: &Project) -> AppResult<String> {
        let name = self.bucket_for(project);
        self.store.ensure_bucket(&name).await?;
        debug!(project_id = %project.id, bucket = %name, "Tenant bucket ready");
        Ok(name)
    }
}
