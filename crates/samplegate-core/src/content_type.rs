//! Content-type guessing for delivery.
//!
//! The storage backend usually knows the stored content type; when it does
//! not, the delivery handler falls back to a guess from the key's file
//! extension, and finally to a generic binary type.

use std::path::Path;

/// Generic binary fallback.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess a content type from the file extension of a storage key.
///
/// The table is intentionally small and video-centric; anything unknown
/// should be served as `application/octet-stream` by the caller.
pub fn guess_content_type(key: &str) -> Option<&'static str> {
    let extension = Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let content_type = match extension.as_str() {
        // Videos
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        // Images (thumbnails, poster frames)
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        // Sidecar files
        "json" => "application/json",
        "txt" => "text/plain",
        "vtt" => "text/vtt",
        "srt" => "application/x-subrip",
        _ => return None,
    };
    Some(content_type)
}

/// Guess a content type, falling back to the generic binary type.
pub fn content_type_or_default(key: &str) -> &'static str {
    guess_content_type(key).unwrap_or(OCTET_STREAM)
}
