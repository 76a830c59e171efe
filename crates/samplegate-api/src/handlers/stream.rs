//! Stream endpoint: range-aware object delivery.
//!
//! Serves object bytes by storage key, honoring single-range `Range`
//! requests with 206 framing and falling back to the full object otherwise.
//! The body is always a lazily-produced stream over the backend read, so
//! arbitrarily large videos never pass through memory as a whole; a slow or
//! disconnecting client suspends or drops the backend read.

use crate::error::{ErrorResponse, HttpAppError};
use crate::range::{plan_range, RangePlan};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use samplegate_core::{content_type, AppError};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub key: Option<String>,
    pub download: Option<String>,
}

fn wants_download(raw: Option<&str>) -> bool {
    matches!(raw, Some("1") | Some("true") | Some("yes") | Some("on"))
}

/// Filename for the content-disposition header: last path segment of the
/// key, with quotes stripped so the header cannot be broken out of.
fn disposition_filename(key: &str) -> String {
    key.rsplit('/')
        .next()
        .unwrap_or(key)
        .replace('"', "")
}

#[utoipa::path(
    get,
    path = "/stream",
    tag = "stream",
    params(
        ("key" = String, Query, description = "Storage key of the object to stream"),
        ("download" = Option<String>, Query, description = "Set to 1 to force a download content-disposition"),
        ("Range" = Option<String>, Header, description = "Optional single byte range, e.g. bytes=500-999")
    ),
    responses(
        (status = 200, description = "Full object", content_type = "application/octet-stream"),
        (status = 206, description = "Requested byte range", content_type = "application/octet-stream"),
        (status = 400, description = "Missing key", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn stream_object(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpAppError> {
    let key = query
        .key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing key query parameter".to_string()))?;

    let meta = state.storage.head(key).await.map_err(|e| {
        if matches!(e, samplegate_storage::StorageError::NotFound(_)) {
            AppError::NotFound("Object not found".to_string()).into()
        } else {
            tracing::error!(key = %key, error = %e, "Failed to fetch object metadata");
            HttpAppError::from(e)
        }
    })?;

    let content_type = meta
        .content_type
        .clone()
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| content_type::content_type_or_default(key).to_string());

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    let plan = plan_range(range_header, meta.size);

    let (status, range) = match plan {
        RangePlan::Full => (StatusCode::OK, None),
        RangePlan::Partial(range) => (StatusCode::PARTIAL_CONTENT, Some(range)),
    };

    tracing::debug!(
        key = %key,
        size = meta.size,
        status = %status,
        range = ?range,
        "Streaming object"
    );

    // Only the requested slice is ever fetched from the backend.
    let stream = state.storage.get_stream(key, range).await.map_err(|e| {
        tracing::error!(key = %key, error = %e, "Failed to open object stream");
        HttpAppError::from(e)
    })?;
    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "no-store");

    if let Some(etag) = &meta.etag {
        builder = builder.header(header::ETAG, etag);
    }
    if let Some(last_modified) = &meta.last_modified {
        builder = builder.header(header::LAST_MODIFIED, last_modified);
    }
    if wants_download(query.download.as_deref()) {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", disposition_filename(key)),
        );
    }

    builder = match range {
        Some(range) => builder
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", range.start, range.end, meta.size),
            )
            .header(header::CONTENT_LENGTH, range.byte_count()),
        None => builder.header(header::CONTENT_LENGTH, meta.size),
    };

    let response = builder.body(Body::from_stream(body_stream)).map_err(|e| {
        tracing::error!(error = %e, "Failed to build response");
        AppError::Internal(e.to_string())
    })?;

    Ok(response)
}
