use crate::traits::{ByteRange, ByteStream, ObjectMeta, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::DateTimeFormat;
use aws_sdk_s3::Client;
use futures::StreamExt;
use std::time::Duration;
use tokio_util::io::ReaderStream;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (Cloudflare R2 uses the literal region "auto")
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "https://<account>.r2.cloudflarestorage.com" for R2,
    ///   "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config.clone())
            .load()
            .await;

        // Configure the client with a custom endpoint if provided. S3-compatible
        // providers need path-style addressing.
        let client = if let Some(ref endpoint) = endpoint_url {
            let mut s3_config_builder = aws_sdk_s3::Config::builder()
                .endpoint_url(endpoint)
                .region(config.region().cloned())
                .retry_config(retry_config);
            if let Some(provider) = config.credentials_provider().into_iter().next() {
                s3_config_builder = s3_config_builder.credentials_provider(provider);
            }
            s3_config_builder = s3_config_builder.force_path_style(true);

            Client::from_conf(s3_config_builder.build())
        } else {
            Client::new(&config)
        };

        Ok(S3Storage { client, bucket })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectMeta> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadObjectError::NotFound(_) => StorageError::NotFound(storage_key.to_string()),
                    _ => StorageError::BackendError(e.to_string()),
                },
                _ => StorageError::BackendError(e.to_string()),
            })?;

        let size = response.content_length().unwrap_or(0).max(0) as u64;

        Ok(ObjectMeta {
            size,
            content_type: response.content_type().map(String::from),
            etag: response.e_tag().map(String::from),
            last_modified: response
                .last_modified()
                .and_then(|dt| dt.fmt(DateTimeFormat::HttpDate).ok()),
        })
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadObjectError::NotFound(_) => Ok(false),
                    _ => Err(StorageError::BackendError(e.to_string())),
                },
                _ => Err(StorageError::BackendError(e.to_string())),
            },
        }
    }

    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    GetObjectError::NoSuchKey(_) => StorageError::NotFound(storage_key.to_string()),
                    _ => {
                        tracing::error!(
                            error = %e,
                            bucket = %self.bucket,
                            key = %storage_key,
                            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                            "S3 get failed"
                        );
                        StorageError::ReadFailed(e.to_string())
                    }
                },
                _ => {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %storage_key,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 get failed"
                    );
                    StorageError::ReadFailed(e.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn get_stream(
        &self,
        storage_key: &str,
        range: Option<ByteRange>,
    ) -> StorageResult<ByteStream> {
        let start = std::time::Instant::now();

        let mut request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key);
        if let Some(range) = range {
            request = request.range(range.header_value());
        }

        let response = request.send().await.map_err(|e| match &e {
            SdkError::ServiceError(service_err) => match service_err.err() {
                GetObjectError::NoSuchKey(_) => StorageError::NotFound(storage_key.to_string()),
                _ => StorageError::ReadFailed(e.to_string()),
            },
            _ => StorageError::ReadFailed(e.to_string()),
        })?;

        // Convert the SDK body to Stream<Item = Result<Bytes, StorageError>>
        // via AsyncRead + ReaderStream
        let async_read = response.body.into_async_read();
        let stream = ReaderStream::new(async_read)
            .map(|result| result.map_err(|e| StorageError::ReadFailed(e.to_string())));

        let bucket = self.bucket.clone();
        let key = storage_key.to_string();
        let logged_stream = stream.map(move |item| {
            if item.is_err() {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream read error"
                );
            }
            item
        });

        Ok(Box::pin(logged_stream))
    }

    async fn presign_get(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning_config = aws_sdk_s3::presigning::PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(presigned_request.uri().to_string())
    }

    async fn list_prefix(&self, prefix: &str, max_keys: i32) -> StorageResult<Vec<String>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(String::from))
            .collect())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
