//! Project repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_entity::project::{CreateProject, Project};

/// Repository for project lookups.
///
/// Project administration lives outside this engine; only resolution and a
/// plain data-layer insert are provided.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a project by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))
    }

    /// Find a project by group and project key.
    pub async fn find_by_key(&self, group_key: &str, key: &str) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE group_key = $1 AND key = $2",
        )
        .bind(group_key)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find project by key", e)
        })
    }

    /// Create a new project record.
    pub async fn create(&self, data: &CreateProject) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (group_key, key, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.group_key)
        .bind(&data.key)
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create project", e))
    }
}
