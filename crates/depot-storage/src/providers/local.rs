//! Local filesystem object-store provider.
//!
//! Buckets are directories under a configured root; blobs are plain files.
//! Intended for development and single-node deployments.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::object_store::{ByteStream, ObjectStore};

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory under which buckets live.
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a new local object store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a bucket/key pair to an absolute path within the root.
    fn resolve(&self, bucket: &str, key: &str) -> PathBuf {
        let clean = key.trim_start_matches('/');
        self.root.join(bucket).join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> AppResult<Option<String>> {
        let full_path = self.resolve(bucket, key);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {bucket}/{key}"),
                e,
            )
        })?;

        debug!(bucket, key, bytes = data.len(), "Wrote blob");
        Ok(None)
    }

    async fn get(&self, bucket: &str, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(bucket, key);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {bucket}/{key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob: {bucket}/{key}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn get_stream(&self, bucket: &str, key: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(bucket, key);
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {bucket}/{key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open blob: {bucket}/{key}"),
                    e,
                )
            }
        })?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(|b| b.into()))))
    }

    async fn delete(&self, bucket: &str, key: &str) -> AppResult<()> {
        let full_path = self.resolve(bucket, key);
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {bucket}/{key}"),
                e,
            )),
        }
    }

    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool> {
        Ok(self.resolve(bucket, key).exists())
    }

    async fn ensure_bucket(&self, bucket: &str) -> AppResult<()> {
        let path = self.root.join(bucket);
        fs::create_dir_all(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create bucket directory: {bucket}"),
                e,
            )
        })?;
        Ok(())
    }

    async fn presigned_url(
        &self,
        _bucket: &str,
        _key: &str,
        _ttl: std::time::Duration,
    ) -> AppResult<String> {
        Err(AppError::not_implemented(
            "Presigned URLs are not supported by the local provider",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        store.ensure_bucket("depot-test").await.unwrap();

        let data = Bytes::from("hello world");
        store
            .put("depot-test", "objects/2c/abc", data.clone(), None)
            .await
            .unwrap();

        assert!(store.exists("depot-test", "objects/2c/abc").await.unwrap());

        let read_back = store.get("depot-test", "objects/2c/abc").await.unwrap();
        assert_eq!(read_back, data);

        store.delete("depot-test", "objects/2c/abc").await.unwrap();
        assert!(!store.exists("depot-test", "objects/2c/abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        store.delete("depot-test", "objects/no/such").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_bucket_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        store.ensure_bucket("depot-twice").await.unwrap();
        store.ensure_bucket("depot-twice").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        let err = store.get("depot-test", "objects/no/such").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
