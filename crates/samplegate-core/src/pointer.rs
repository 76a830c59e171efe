//! Pointer records.
//!
//! The ingestion side writes one small JSON document per identifier at
//! `pointers/<id>.json`, mapping the identifier to the storage key of the
//! uploaded video plus display metadata. The gateway only ever reads these.

use serde::{Deserialize, Serialize};

/// Pointer record as written by the upload pipeline.
///
/// `key` is the *intended* storage location of the video; the object may in
/// practice live at a slightly different key (see the key resolution
/// fallback in the resolver). Unknown fields are ignored so the record can
/// grow without breaking older gateways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerRecord {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub company: Option<String>,
}

impl PointerRecord {
    /// Whether the record carries a usable storage key.
    pub fn has_key(&self) -> bool {
        !self.key.trim().is_empty()
    }
}
