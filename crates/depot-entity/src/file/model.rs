//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

/// Deletion state of a file or folder entry.
///
/// Modeled as a sum type so the deletion timestamp and actor can never
/// desynchronize from the flag. The underlying columns are
/// `is_deleted`/`deleted_at`/`deleted_by`; decoding a row where they
/// disagree fails instead of producing a half-deleted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeletionState {
    /// The entry is live.
    Active,
    /// The entry is in the recycle state and can be restored.
    Deleted {
        /// When the entry was deleted.
        at: DateTime<Utc>,
        /// Who deleted it.
        by: Uuid,
    },
}

impl DeletionState {
    /// Reassemble the state from its storage columns.
    ///
    /// Returns `None` when the columns are mutually inconsistent.
    pub fn from_columns(
        is_deleted: bool,
        deleted_at: Option<DateTime<Utc>>,
        deleted_by: Option<Uuid>,
    ) -> Option<Self> {
        match (is_deleted, deleted_at, deleted_by) {
            (false, None, None) => Some(Self::Active),
            (true, Some(at), Some(by)) => Some(Self::Deleted { at, by }),
            _ => None,
        }
    }

    /// Whether the entry is deleted.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// A logical file or folder entry stored in Depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The owning project.
    pub project_id: Uuid,
    /// Normalized logical folder path (always with a trailing separator).
    pub folder_path: String,
    /// The display name (including extension).
    pub name: String,
    /// SHA-256 content hash; `None` for folders.
    pub content_hash: Option<String>,
    /// Size in bytes of the current version (0 for folders).
    pub size_bytes: i64,
    /// MIME type of the file.
    pub mime_type: Option<String>,
    /// Whether this entry is a folder.
    pub is_folder: bool,
    /// Current version number (0 for folders).
    pub current_version: i32,
    /// Soft-delete state.
    pub deletion: DeletionState,
    /// The user who uploaded the current version.
    pub uploaded_by: Uuid,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Whether the entry is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deletion.is_deleted()
    }

    /// Full logical path of this entry (folder path + name).
    pub fn full_path(&self) -> String {
        format!("{}{}", self.folder_path, self.name)
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

impl sqlx::FromRow<'_, PgRow> for File {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let is_deleted: bool = row.try_get("is_deleted")?;
        let deleted_at: Option<DateTime<Utc>> = row.try_get("deleted_at")?;
        let deleted_by: Option<Uuid> = row.try_get("deleted_by")?;

        let deletion = DeletionState::from_columns(is_deleted, deleted_at, deleted_by).ok_or(
            sqlx::Error::ColumnDecode {
                index: "is_deleted".into(),
                source: "inconsistent deletion columns".into(),
            },
        )?;

        Ok(Self {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            folder_path: row.try_get("folder_path")?,
            name: row.try_get("name")?,
            content_hash: row.try_get("content_hash")?,
            size_bytes: row.try_get("size_bytes")?,
            mime_type: row.try_get("mime_type")?,
            is_folder: row.try_get("is_folder")?,
            current_version: row.try_get("current_version")?,
            deletion,
            uploaded_by: row.try_get("uploaded_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Data required to create a new file or folder record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The owning project.
    pub project_id: Uuid,
    /// Normalized folder path.
    pub folder_path: String,
    /// The entry name.
    pub name: String,
    /// SHA-256 content hash; `None` for folders.
    pub content_hash: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Whether this entry is a folder.
    pub is_folder: bool,
    /// Initial version number (1 for files, 0 for folders).
    pub current_version: i32,
    /// The uploader.
    pub uploaded_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_state_rejects_desynchronized_columns() {
        assert!(DeletionState::from_columns(true, None, None).is_none());
        assert!(DeletionState::from_columns(false, Some(Utc::now()), None).is_none());
        assert!(DeletionState::from_columns(true, Some(Utc::now()), None).is_none());
    }

    #[test]
    fn deletion_state_round_trips_consistent_columns() {
        let by = Uuid::new_v4();
        let at = Utc::now();
        assert_eq!(
            DeletionState::from_columns(false, None, None),
            Some(DeletionState::Active)
        );
        assert_eq!(
            DeletionState::from_columns(true, Some(at), Some(by)),
            Some(DeletionState::Deleted { at, by })
        );
    }

    #[test]
    fn full_path_joins_folder_and_name() {
        let file = File {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            folder_path: "/docs/".to_string(),
            name: "a.txt".to_string(),
            content_hash: Some("h".to_string()),
            size_bytes: 1,
            mime_type: None,
            is_folder: false,
            current_version: 1,
            deletion: DeletionState::Active,
            uploaded_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(file.full_path(), "/docs/a.txt");
        assert_eq!(file.extension().as_deref(), Some("txt"));
    }
}
