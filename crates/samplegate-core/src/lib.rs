//! Samplegate Core Library
//!
//! Shared types for the sample delivery gateway: configuration, error types,
//! the sanitized sample identifier, the pointer record written by the
//! ingestion side, and content-type guessing for delivery.

pub mod config;
pub mod content_type;
pub mod error;
pub mod identifier;
pub mod pointer;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, DeliveryMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use identifier::SampleId;
pub use pointer::PointerRecord;
pub use storage_types::StorageBackend;
