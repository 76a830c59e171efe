//! Resolve endpoint: identifier to delivery reference.
//!
//! Every outcome, including business failures, is delivered as HTTP 200 with
//! a structured JSON body. Callers render the `error` field instead of
//! special-casing transport status; transport status is reserved for
//! transport problems. Backend faults are folded into the same envelope as
//! a `SERVER` error.

use crate::services::resolver::{self, DeliveryRef, ResolveOutcome};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use samplegate_core::SampleId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub id: Option<String>,
}

/// Business-level error codes carried inside the 200 envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolveErrorCode {
    MissingId,
    PointerNotFound,
    EmptyKey,
    ObjectNotFound,
    Server,
}

/// Response envelope of the resolve endpoint.
///
/// Exactly one of `signedUrl` / `streamUrl` is set on success, depending on
/// the configured delivery mode. `link` is the canonical landing page for
/// the identifier and is present whenever an identifier was given, even on
/// failure.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct SampleResponse {
    #[serde(rename = "signedUrl", skip_serializing_if = "Option::is_none")]
    pub signed_url: Option<String>,
    #[serde(rename = "streamUrl", skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    pub company: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "foundKey", skip_serializing_if = "Option::is_none")]
    pub found_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResolveErrorCode>,
    #[serde(rename = "wantedKey", skip_serializing_if = "Option::is_none")]
    pub wanted_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Derive the request's own origin from its headers, as a fallback when no
/// public base URL is configured.
fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    Some(format!("{}://{}", proto, host))
}

#[utoipa::path(
    get,
    path = "/api/sample",
    tag = "resolve",
    params(
        ("id" = Option<String>, Query, description = "Sanitized sample identifier (or a raw email, which is sanitized)")
    ),
    responses(
        (status = 200, description = "Resolution outcome, success or structured error", body = SampleResponse)
    )
)]
pub async fn resolve_sample(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SampleQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let no_store = [(header::CACHE_CONTROL, "no-store")];

    let Some(id) = query.id.as_deref().and_then(SampleId::parse) else {
        return (
            no_store,
            Json(SampleResponse {
                error: Some(ResolveErrorCode::MissingId),
                message: Some("Missing id query parameter".to_string()),
                ..Default::default()
            }),
        );
    };

    // The canonical landing link is computable regardless of resolution
    // outcome; callers always get something to send.
    let base = state
        .config
        .public_base
        .clone()
        .or_else(|| request_origin(&headers));
    let link = base.map(|base| format!("{}{}", base, id.landing_path()));

    let outcome = resolver::resolve(
        state.storage.as_ref(),
        &id,
        state.config.delivery_mode,
        Duration::from_secs(state.config.presign_expiry_secs),
    )
    .await;

    let response = match outcome {
        Ok(ResolveOutcome::Resolved {
            delivery,
            company,
            found_key,
        }) => {
            let (signed_url, stream_url) = match delivery {
                DeliveryRef::Signed(url) => (Some(url), None),
                DeliveryRef::Stream(url) => (None, Some(url)),
            };
            SampleResponse {
                signed_url,
                stream_url,
                company,
                link,
                found_key: Some(found_key),
                ..Default::default()
            }
        }
        Ok(ResolveOutcome::PointerNotFound) => SampleResponse {
            link,
            error: Some(ResolveErrorCode::PointerNotFound),
            message: Some(format!("No sample registered for id {}", id)),
            ..Default::default()
        },
        Ok(ResolveOutcome::EmptyKey { company }) => SampleResponse {
            company,
            link,
            error: Some(ResolveErrorCode::EmptyKey),
            message: Some("Pointer record has no storage key".to_string()),
            ..Default::default()
        },
        Ok(ResolveOutcome::ObjectNotFound {
            wanted_key,
            company,
        }) => SampleResponse {
            company,
            link,
            error: Some(ResolveErrorCode::ObjectNotFound),
            wanted_key: Some(wanted_key),
            message: Some("Sample video is no longer available".to_string()),
            ..Default::default()
        },
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Resolve failed on backend call");
            SampleResponse {
                link,
                error: Some(ResolveErrorCode::Server),
                message: Some("Storage backend unavailable".to_string()),
                ..Default::default()
            }
        }
    };

    (no_store, Json(response))
}
