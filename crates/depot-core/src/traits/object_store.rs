//! Object-store trait for pluggable blob storage backends.
//!
//! The relational metadata store is the single source of truth for
//! existence and ordering; implementations of this trait only move bytes
//! and are never consulted to decide either.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for S3-style object storage backends.
///
/// Buckets are tenant namespaces; keys are content-addressed blob paths
/// within them. Implementations exist for the local filesystem and for
/// S3-compatible services.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write a blob, returning the backend's content tag (ETag) if any.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<Option<String>>;

    /// Read a blob into memory as a complete byte buffer.
    async fn get(&self, bucket: &str, key: &str) -> AppResult<Bytes>;

    /// Read a blob as a byte stream.
    async fn get_stream(&self, bucket: &str, key: &str) -> AppResult<ByteStream>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> AppResult<()>;

    /// Check whether a blob exists.
    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool>;

    /// Create the bucket if it does not already exist. Idempotent.
    async fn ensure_bucket(&self, bucket: &str) -> AppResult<()>;

    /// Generate a presigned download URL valid for `ttl`.
    async fn presigned_url(&self, bucket: &str, key: &str, ttl: Duration) -> AppResult<String>;
}
