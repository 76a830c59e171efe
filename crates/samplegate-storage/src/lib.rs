//! Samplegate Storage Library
//!
//! Read-only storage abstraction for the gateway. The `Storage` trait covers
//! exactly the operations the resolver and the range delivery engine need:
//! metadata lookup, existence checks, small-object reads (pointer records),
//! ranged streaming reads, presigned GET URLs, and bounded prefix listing.
//!
//! Backends: S3 (and S3-compatible providers such as Cloudflare R2 via a
//! custom endpoint) and the local filesystem for development and tests.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use samplegate_core::StorageBackend;
pub use traits::{ByteRange, ByteStream, ObjectMeta, Storage, StorageError, StorageResult};
