//! Pointer resolution.
//!
//! Turns a sample identifier into a concrete delivery reference in three
//! stages: load the pointer record, resolve the actual storage key (the key
//! the uploader intended is not always the key that exists), and produce
//! either a presigned URL or a same-origin streaming reference.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use samplegate_core::{DeliveryMode, PointerRecord, SampleId};
use samplegate_storage::{Storage, StorageError, StorageResult};
use std::time::Duration;

/// Characters escaped inside the `key` query value of a stream reference.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?');

/// Delivery reference handed back to the client on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryRef {
    /// Time-limited presigned URL granting direct read access.
    Signed(String),
    /// Site-relative `/stream?key=...` reference served by this gateway.
    Stream(String),
}

/// Result of resolving an identifier. Business failures are ordinary
/// outcomes here; only backend faults surface as `Err`.
#[derive(Debug)]
pub enum ResolveOutcome {
    Resolved {
        delivery: DeliveryRef,
        company: Option<String>,
        found_key: String,
    },
    /// No pointer record exists for the identifier.
    PointerNotFound,
    /// The pointer record exists but carries no usable key.
    EmptyKey { company: Option<String> },
    /// The key could not be resolved to an existing object.
    ObjectNotFound {
        wanted_key: String,
        company: Option<String>,
    },
}

/// Resolve an identifier to a delivery reference.
pub async fn resolve(
    storage: &dyn Storage,
    id: &SampleId,
    mode: DeliveryMode,
    presign_expiry: Duration,
) -> StorageResult<ResolveOutcome> {
    let pointer_key = id.pointer_key();

    let raw = match storage.get(&pointer_key).await {
        Ok(raw) => raw,
        Err(StorageError::NotFound(_)) => {
            tracing::info!(id = %id, pointer_key = %pointer_key, "Pointer record not found");
            return Ok(ResolveOutcome::PointerNotFound);
        }
        Err(e) => return Err(e),
    };

    let record: PointerRecord = match serde_json::from_slice(&raw) {
        Ok(record) => record,
        Err(e) => {
            // A malformed record is a data error, not a backend fault: the
            // pointer is unusable, same as one with no key.
            tracing::warn!(id = %id, error = %e, "Pointer record is not valid JSON");
            return Ok(ResolveOutcome::EmptyKey { company: None });
        }
    };

    if !record.has_key() {
        return Ok(ResolveOutcome::EmptyKey {
            company: record.company,
        });
    }

    let wanted_key = record.key.trim().to_string();
    let Some(found_key) = resolve_key(storage, &wanted_key).await? else {
        tracing::warn!(id = %id, wanted_key = %wanted_key, "Object not found under any key variant");
        return Ok(ResolveOutcome::ObjectNotFound {
            wanted_key,
            company: record.company,
        });
    };

    let delivery = match mode {
        DeliveryMode::Presigned => {
            let url = storage.presign_get(&found_key, presign_expiry).await?;
            DeliveryRef::Signed(url)
        }
        DeliveryMode::Stream => DeliveryRef::Stream(format!(
            "/stream?key={}",
            utf8_percent_encode(&found_key, QUERY_VALUE)
        )),
    };

    tracing::info!(id = %id, found_key = %found_key, "Resolved sample");

    Ok(ResolveOutcome::Resolved {
        delivery,
        company: record.company,
        found_key,
    })
}

/// Resolve the actual storage key for a candidate key, tolerating key-layout
/// drift between what the uploader intended and what exists.
///
/// Ordered, short-circuiting attempts, cheapest and most specific first:
/// 1. exact match;
/// 2. `<key>/<basename(key)>` — some upload tools repeat the filename as a
///    child of a directory named after it;
/// 3. first object listed under `<key>/` (backend default order, which is
///    not guaranteed stable when several objects share the prefix).
pub async fn resolve_key(
    storage: &dyn Storage,
    candidate: &str,
) -> StorageResult<Option<String>> {
    if storage.exists(candidate).await? {
        return Ok(Some(candidate.to_string()));
    }

    if !candidate.ends_with('/') {
        if let Some(basename) = candidate.rsplit('/').next() {
            let nested = format!("{}/{}", candidate, basename);
            if storage.exists(&nested).await? {
                tracing::debug!(candidate = %candidate, nested = %nested, "Key resolved via nested-path heuristic");
                return Ok(Some(nested));
            }
        }
    }

    let prefix = if candidate.ends_with('/') {
        candidate.to_string()
    } else {
        format!("{}/", candidate)
    };
    let listed = storage.list_prefix(&prefix, 1).await?;
    if let Some(first) = listed.into_iter().next() {
        tracing::debug!(candidate = %candidate, found = %first, "Key resolved via prefix listing");
        return Ok(Some(first));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use samplegate_storage::LocalStorage;
    use std::path::Path;
    use tempfile::tempdir;

    async fn write_object(dir: &Path, key: &str, data: &[u8]) {
        let path = dir.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.unwrap();
        }
        tokio::fs::write(&path, data).await.unwrap();
    }

    async fn storage_in(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:8080/files".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_key_exact_match() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(dir.path(), "videos/jane_acme_com__tour.mp4", b"video").await;

        let found = resolve_key(&storage, "videos/jane_acme_com__tour.mp4")
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("videos/jane_acme_com__tour.mp4"));
    }

    #[tokio::test]
    async fn test_resolve_key_nested_path() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(
            dir.path(),
            "videos/jane_acme_com__tour.mp4/jane_acme_com__tour.mp4",
            b"video",
        )
        .await;

        let found = resolve_key(&storage, "videos/jane_acme_com__tour.mp4")
            .await
            .unwrap();
        assert_eq!(
            found.as_deref(),
            Some("videos/jane_acme_com__tour.mp4/jane_acme_com__tour.mp4")
        );
    }

    #[tokio::test]
    async fn test_resolve_key_prefix_listing() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(
            dir.path(),
            "videos/jane_acme_com__tour.mp4/renamed.mp4",
            b"video",
        )
        .await;

        let found = resolve_key(&storage, "videos/jane_acme_com__tour.mp4")
            .await
            .unwrap();
        assert_eq!(
            found.as_deref(),
            Some("videos/jane_acme_com__tour.mp4/renamed.mp4")
        );
    }

    #[tokio::test]
    async fn test_resolve_key_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let found = resolve_key(&storage, "videos/missing.mp4").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_resolve_pointer_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let id = SampleId::parse("jane_acme_com").unwrap();
        let outcome = resolve(
            &storage,
            &id,
            DeliveryMode::Presigned,
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, ResolveOutcome::PointerNotFound));
    }

    #[tokio::test]
    async fn test_resolve_empty_key() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(
            dir.path(),
            "pointers/jane_acme_com.json",
            br#"{"key":"","company":"Acme Homes"}"#,
        )
        .await;

        let id = SampleId::parse("jane_acme_com").unwrap();
        let outcome = resolve(
            &storage,
            &id,
            DeliveryMode::Presigned,
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        match outcome {
            ResolveOutcome::EmptyKey { company } => {
                assert_eq!(company.as_deref(), Some("Acme Homes"));
            }
            other => panic!("Expected EmptyKey, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_malformed_pointer_is_empty_key() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(dir.path(), "pointers/jane_acme_com.json", b"not json").await;

        let id = SampleId::parse("jane_acme_com").unwrap();
        let outcome = resolve(
            &storage,
            &id,
            DeliveryMode::Presigned,
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, ResolveOutcome::EmptyKey { company: None }));
    }

    #[tokio::test]
    async fn test_resolve_object_not_found_carries_wanted_key() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(
            dir.path(),
            "pointers/jane_acme_com.json",
            br#"{"key":"videos/gone.mp4","company":"Acme Homes"}"#,
        )
        .await;

        let id = SampleId::parse("jane_acme_com").unwrap();
        let outcome = resolve(
            &storage,
            &id,
            DeliveryMode::Presigned,
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        match outcome {
            ResolveOutcome::ObjectNotFound {
                wanted_key,
                company,
            } => {
                assert_eq!(wanted_key, "videos/gone.mp4");
                assert_eq!(company.as_deref(), Some("Acme Homes"));
            }
            other => panic!("Expected ObjectNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_success_presigned() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(dir.path(), "videos/jane_acme_com__tour.mp4", b"video").await;
        write_object(
            dir.path(),
            "pointers/jane_acme_com.json",
            br#"{"key":"videos/jane_acme_com__tour.mp4","company":"Acme Homes"}"#,
        )
        .await;

        let id = SampleId::parse("jane_acme_com").unwrap();
        let outcome = resolve(
            &storage,
            &id,
            DeliveryMode::Presigned,
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        match outcome {
            ResolveOutcome::Resolved {
                delivery,
                company,
                found_key,
            } => {
                assert_eq!(found_key, "videos/jane_acme_com__tour.mp4");
                assert_eq!(company.as_deref(), Some("Acme Homes"));
                assert!(matches!(delivery, DeliveryRef::Signed(url) if url.contains("jane_acme_com__tour.mp4")));
            }
            other => panic!("Expected Resolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_success_stream_mode() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        write_object(dir.path(), "videos/jane_acme_com__tour.mp4", b"video").await;
        write_object(
            dir.path(),
            "pointers/jane_acme_com.json",
            br#"{"key":"videos/jane_acme_com__tour.mp4"}"#,
        )
        .await;

        let id = SampleId::parse("jane_acme_com").unwrap();
        let outcome = resolve(&storage, &id, DeliveryMode::Stream, Duration::from_secs(60))
            .await
            .unwrap();
        match outcome {
            ResolveOutcome::Resolved { delivery, .. } => {
                assert_eq!(
                    delivery,
                    DeliveryRef::Stream(
                        "/stream?key=videos/jane_acme_com__tour.mp4".to_string()
                    )
                );
            }
            other => panic!("Expected Resolved, got {:?}", other),
        }
    }
}
