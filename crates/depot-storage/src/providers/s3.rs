//! S3-compatible object-store provider (requires the `s3` feature).
//!
//! Works against AWS S3 and MinIO-style services. Uses path-style
//! addressing and static credentials so MinIO endpoints work unchanged.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use depot_core::config::storage::S3StorageConfig;
use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::object_store::{ByteStream, ObjectStore};

/// S3-compatible object store.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a new S3 object store from configuration.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            "Initializing S3 object store"
        );

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "depot-static",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self.client.list_buckets().send().await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<Option<String>> {
        let len = data.len();
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(S3ByteStream::from(data))
            .set_content_type(content_type.map(String::from))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write blob: {bucket}/{key}"),
                    e,
                )
            })?;

        debug!(bucket, key, bytes = len, "Wrote blob");
        Ok(output.e_tag().map(|tag| tag.trim_matches('"').to_string()))
    }

    async fn get(&self, bucket: &str, key: &str) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Blob not found: {bucket}/{key}"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to read blob: {bucket}/{key}"),
                        e,
                    )
                }
            })?;

        let aggregated = output.body.collect().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to collect blob body: {bucket}/{key}"),
                e,
            )
        })?;
        Ok(aggregated.into_bytes())
    }

    async fn get_stream(&self, bucket: &str, key: &str) -> AppResult<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Blob not found: {bucket}/{key}"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to open blob: {bucket}/{key}"),
                        e,
                    )
                }
            })?;

        let reader = output.body.into_async_read();
        Ok(Box::pin(ReaderStream::new(reader).map(|r| r.map(Into::into))))
    }

    async fn delete(&self, bucket: &str, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete blob: {bucket}/{key}"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to check blob: {bucket}/{key}"),
                e,
            )),
        }
    }

    async fn ensure_bucket(&self, bucket: &str) -> AppResult<()> {
        if self.client.head_bucket().bucket(bucket).send().await.is_ok() {
            return Ok(());
        }

        match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => {
                info!(bucket, "Created tenant bucket");
                Ok(())
            }
            Err(e)
                if e.as_service_error().is_some_and(|se| {
                    se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()
                }) =>
            {
                Ok(())
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create bucket: {bucket}"),
                e,
            )),
        }
    }

    async fn presigned_url(&self, bucket: &str, key: &str, ttl: Duration) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(ttl).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Invalid presign TTL: {ttl:?}"),
                e,
            )
        })?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to presign: {bucket}/{key}"),
                    e,
                )
            })?;

        Ok(request.uri().to_string())
    }
}
