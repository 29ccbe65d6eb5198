//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A historical version of a file.
///
/// Versions are append-only and immutable: they are never edited or
/// removed, even after the owning file is soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// Sequential version number, starting at 1.
    pub version_number: i32,
    /// SHA-256 content hash of this version.
    pub content_hash: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// User who created this version.
    pub uploaded_by: Uuid,
    /// Optional comment describing the change.
    pub comment: Option<String>,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a new version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVersion {
    /// The owning file.
    pub file_id: Uuid,
    /// Version number being recorded.
    pub version_number: i32,
    /// Content hash.
    pub content_hash: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// The uploader.
    pub uploaded_by: Uuid,
    /// Optional comment.
    pub comment: Option<String>,
}
