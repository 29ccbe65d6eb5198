//! File share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Result of evaluating a share's constraints at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareValidity {
    /// The share may be used.
    Valid,
    /// The share was cancelled by its creator.
    Cancelled,
    /// The share is past its expiry timestamp.
    Expired,
    /// The download limit has been reached.
    Exhausted,
}

/// A share granting constrained public access to one file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileShare {
    /// Unique share identifier.
    pub id: Uuid,
    /// The shared file.
    pub file_id: Uuid,
    /// Globally unique share code.
    pub code: String,
    /// Argon2id password hash, if the share is password-protected.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// When the share expires (`None` = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum number of downloads (0 = unlimited).
    pub download_limit: i32,
    /// Current download count; monotonically non-decreasing.
    pub download_count: i32,
    /// Whether the share is active (false after explicit cancellation).
    pub is_active: bool,
    /// User who created the share.
    pub created_by: Uuid,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
    /// Last time the share was accessed.
    pub last_accessed: Option<DateTime<Utc>>,
}

impl FileShare {
    /// Whether the share is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Whether the download limit has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.download_limit > 0 && self.download_count >= self.download_limit
    }

    /// Whether a password is required to access the share.
    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Evaluate the share's constraints at `now`. Password verification is
    /// separate; this only covers state, expiry, and exhaustion.
    pub fn validity(&self, now: DateTime<Utc>) -> ShareValidity {
        if !self.is_active {
            ShareValidity::Cancelled
        } else if self.is_expired(now) {
            ShareValidity::Expired
        } else if self.is_exhausted() {
            ShareValidity::Exhausted
        } else {
            ShareValidity::Valid
        }
    }
}

/// Data required to create a new share record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShare {
    /// The file being shared.
    pub file_id: Uuid,
    /// Share code.
    pub code: String,
    /// Argon2id password hash (optional).
    pub password_hash: Option<String>,
    /// Expiry timestamp (optional).
    pub expires_at: Option<DateTime<Utc>>,
    /// Download limit (0 = unlimited).
    pub download_limit: i32,
    /// The creator.
    pub created_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn share(limit: i32, count: i32, expires: Option<DateTime<Utc>>, active: bool) -> FileShare {
        FileShare {
            id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            code: "ABCDEFGHIJ".to_string(),
            password_hash: None,
            expires_at: expires,
            download_limit: limit,
            download_count: count,
            is_active: active,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            last_accessed: None,
        }
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let s = share(0, 1_000_000, None, true);
        assert!(!s.is_exhausted());
        assert_eq!(s.validity(Utc::now()), ShareValidity::Valid);
    }

    #[test]
    fn limit_reached_is_exhausted() {
        let s = share(1, 1, None, true);
        assert!(s.is_exhausted());
        assert_eq!(s.validity(Utc::now()), ShareValidity::Exhausted);
    }

    #[test]
    fn expiry_is_checked_before_exhaustion() {
        let now = Utc::now();
        let s = share(1, 1, Some(now - Duration::hours(1)), true);
        assert_eq!(s.validity(now), ShareValidity::Expired);
    }

    #[test]
    fn cancelled_wins_over_everything() {
        let now = Utc::now();
        let s = share(1, 1, Some(now - Duration::hours(1)), false);
        assert_eq!(s.validity(now), ShareValidity::Cancelled);
    }
}
