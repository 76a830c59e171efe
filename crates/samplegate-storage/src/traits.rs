//! Storage abstraction trait
//!
//! This module defines the read-only Storage trait that all backends must
//! implement. The gateway never writes; objects and pointer records are
//! owned by the ingestion pipeline.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Streamed object bytes, chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Metadata of a stored object, as reported by the backend's head call.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    /// HTTP-date formatted last modification time, when the backend knows it.
    pub last_modified: Option<String>,
}

/// Inclusive byte range within an object.
///
/// Invariant: `start <= end < size` of the object it refers to. Construction
/// and clamping happen at the HTTP layer; backends can trust the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range. Always at least 1 because
    /// `start <= end` holds by construction.
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Header value for a ranged backend read, e.g. `bytes=500-999`.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// Read-only storage abstraction.
///
/// All backends (S3, local filesystem) must implement this trait so the
/// handlers can work against any backend without coupling to implementation
/// details, and so tests can run against the local backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch object metadata by key. Missing objects yield `NotFound`.
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectMeta>;

    /// Check if an object exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Read a whole small object into memory (pointer records only; video
    /// bytes always go through `get_stream`).
    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Stream an object's bytes, optionally restricted to a byte range.
    ///
    /// The stream yields `Bytes` chunks as they become available; dropping
    /// it releases the in-flight backend read.
    async fn get_stream(
        &self,
        storage_key: &str,
        range: Option<ByteRange>,
    ) -> StorageResult<ByteStream>;

    /// Generate a presigned/temporary URL for direct GET access.
    ///
    /// This hands clients time-limited access to one object without routing
    /// the bytes through the gateway.
    async fn presign_get(&self, storage_key: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// List up to `max_keys` object keys starting with `prefix`, in the
    /// backend's default order.
    async fn list_prefix(&self, prefix: &str, max_keys: i32) -> StorageResult<Vec<String>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
