//! Sample identifiers.
//!
//! A sample is addressed by a sanitized form of the recipient's email:
//! lower-cased, with `@` and `.` replaced by `_` (`jane@acme.com` →
//! `jane_acme_com`). The identifier is the only lookup key the gateway
//! accepts; it maps to a pointer record at `pointers/<id>.json` and a
//! landing page at `/p/?id=<id>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sanitized sample identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(String);

impl SampleId {
    /// Derive an identifier from a raw email address.
    pub fn from_email(email: &str) -> Self {
        SampleId(
            email
                .trim()
                .to_lowercase()
                .replace('@', "_")
                .replace('.', "_"),
        )
    }

    /// Parse an identifier from a query-string value.
    ///
    /// An empty or whitespace-only value yields `None`. A raw email is
    /// sanitized rather than rejected so that callers holding either form
    /// reach the same sample.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.contains('@') {
            return Some(Self::from_email(trimmed));
        }
        Some(SampleId(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key of the pointer record for this identifier.
    pub fn pointer_key(&self) -> String {
        format!("pointers/{}.json", self.0)
    }

    /// Site-relative landing page path for this identifier.
    pub fn landing_path(&self) -> String {
        format!("/p/?id={}", self.0)
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
