//! Configuration module
//!
//! Environment-driven configuration for the gateway: server binding, link
//! base, delivery mode, and storage backend selection.

use std::env;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8080;
const PRESIGN_EXPIRY_SECS: u64 = 86_400; // 24 hours

/// How the resolve endpoint hands delivery back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Time-limited presigned URL pointing straight at the storage backend.
    Presigned,
    /// Same-origin `/stream?key=...` reference served by this gateway.
    Stream,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Canonical link base (e.g. `https://samples.example.com`). When unset,
    /// the resolve handler falls back to the request's own origin.
    pub public_base: Option<String>,
    pub delivery_mode: DeliveryMode,
    pub presign_expiry_secs: u64,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (R2, MinIO, ...)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let delivery_mode = match env::var("DELIVERY_MODE")
            .unwrap_or_else(|_| "presigned".to_string())
            .to_lowercase()
            .as_str()
        {
            "stream" => DeliveryMode::Stream,
            "presigned" => DeliveryMode::Presigned,
            other => {
                return Err(anyhow::anyhow!(
                    "DELIVERY_MODE must be 'presigned' or 'stream', got '{}'",
                    other
                ))
            }
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| s.parse::<StorageBackend>().ok());

        Ok(Config {
            server_port: env::var("PORT")
                .or_else(|_| env::var("SERVER_PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            public_base: env::var("PUBLIC_BASE").ok().and_then(normalize_base_url),
            delivery_mode,
            presign_expiry_secs: env::var("PRESIGN_EXPIRY_SECS")
                .unwrap_or_else(|_| PRESIGN_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(PRESIGN_EXPIRY_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

/// Normalize a configured base URL: prepend `https://` when no scheme is
/// given, trim trailing slashes, and drop blank values.
pub fn normalize_base_url(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    Some(with_scheme.trim_end_matches('/').to_string())
}
