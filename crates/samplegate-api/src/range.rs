//! Byte-range request planning.
//!
//! Parses the single-range form of the `Range` header (`bytes=<start>-<end>?`)
//! against a known object size and decides how the object will be served.
//!
//! The policy for malformed or unsatisfiable ranges is lenient: the request
//! falls back to the full object instead of a 416. A malformed start parses
//! as 0 (which also covers the suffix form `bytes=-500`); a missing or
//! malformed end means "through the last byte". The clamped range always
//! satisfies `start <= end < size`.

use samplegate_storage::ByteRange;

/// How a request will be served after range negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePlan {
    /// Serve the whole object with status 200.
    Full,
    /// Serve the clamped byte range with status 206.
    Partial(ByteRange),
}

/// Plan the response framing for an optional `Range` header value.
pub fn plan_range(header: Option<&str>, size: u64) -> RangePlan {
    let Some(header) = header else {
        return RangePlan::Full;
    };
    if size == 0 {
        return RangePlan::Full;
    }

    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return RangePlan::Full;
    };
    // Single-range grammar only; multipart ranges fall back to the full object.
    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangePlan::Full;
    };
    if end_str.contains(',') || start_str.contains(',') {
        return RangePlan::Full;
    }

    let start: u64 = start_str.trim().parse().unwrap_or(0);
    let end: u64 = end_str
        .trim()
        .parse()
        .map(|end: u64| end.min(size - 1))
        .unwrap_or(size - 1);

    if start >= size || start > end {
        return RangePlan::Full;
    }

    RangePlan::Partial(ByteRange { start, end })
}
