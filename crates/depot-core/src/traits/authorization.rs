//! Authorization collaborator trait.
//!
//! Policy evaluation lives in an external engine; this crate only consumes
//! a boolean permission check as a pre-condition gate before each mutating
//! operation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Actions the engine gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read file metadata or content.
    Read,
    /// Upload, revert, or create folders.
    Write,
    /// Soft-delete, restore, or permanently delete.
    Delete,
    /// Create or cancel share links.
    Share,
}

impl Action {
    /// Stable string form used in messages and audit fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Share => "share",
        }
    }
}

/// Boolean permission check consumed by every mutating service operation.
#[async_trait]
pub trait Authorizer: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `subject` may perform `action` on `resource` within `domain`
    /// (a project or group scope identifier).
    async fn check_permission(
        &self,
        subject: Uuid,
        domain: &str,
        resource: Uuid,
        action: Action,
    ) -> AppResult<bool>;

    /// Gate variant: errors with `Authorization` when the check fails.
    async fn require(
        &self,
        subject: Uuid,
        domain: &str,
        resource: Uuid,
        action: Action,
    ) -> AppResult<()> {
        if self.check_permission(subject, domain, resource, action).await? {
            Ok(())
        } else {
            Err(AppError::permission_denied(format!(
                "Subject {subject} may not {} resource {resource}",
                action.as_str()
            )))
        }
    }
}

/// Permissive authorizer for embedding contexts and tests.
#[derive(Debug, Clone, Default)]
pub struct OpenAuthorizer;

#[async_trait]
impl Authorizer for OpenAuthorizer {
    async fn check_permission(
        &self,
        _subject: Uuid,
        _domain: &str,
        _resource: Uuid,
        _action: Action,
    ) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct DenyAll;

    #[async_trait]
    impl Authorizer for DenyAll {
        async fn check_permission(
            &self,
            _subject: Uuid,
            _domain: &str,
            _resource: Uuid,
            _action: Action,
        ) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn require_maps_false_to_authorization_error() {
        let err = DenyAll
            .require(Uuid::new_v4(), "project", Uuid::new_v4(), Action::Write)
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn open_authorizer_allows() {
        OpenAuthorizer
            .require(Uuid::new_v4(), "project", Uuid::new_v4(), Action::Delete)
            .await
            .unwrap();
    }
}
