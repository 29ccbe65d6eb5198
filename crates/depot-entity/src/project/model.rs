//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A project: the unit files are scoped under.
///
/// Projects belong to a group; the group key determines the tenant storage
/// namespace (bucket). Project administration is handled elsewhere — this
/// engine only resolves projects by id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project identifier.
    pub id: Uuid,
    /// Owning group identifier (tenant key).
    pub group_key: String,
    /// Project key (URL-safe slug, unique within the group).
    pub key: String,
    /// Display name.
    pub name: String,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new project record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Owning group identifier.
    pub group_key: String,
    /// Project key.
    pub key: String,
    /// Display name.
    pub name: String,
}
