//! Cursor-based pagination for list responses
//!
//! Cursors are opaque to callers: standard base64 over a small JSON object
//! recording the next start offset, the collection size when the cursor was
//! issued, and the issue time in Unix milliseconds.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Page size used when the caller does not ask for one
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page a caller may request
pub const MAX_LIMIT: usize = 100;

/// How long an issued cursor stays valid
pub const CURSOR_TTL_MS: i64 = 60 * 60 * 1000;

/// Tolerated clock skew for cursors stamped in the future
const CLOCK_SKEW_MS: i64 = 60 * 1000;

/// Decoded cursor contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub index: usize,
    pub total: usize,
    pub timestamp: i64,
}

/// Pagination request options
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Clamp a requested limit into `1..=MAX_LIMIT`
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub fn encode_cursor(cursor: &Cursor) -> String {
    // Serializing three integers cannot fail.
    let json = serde_json::to_vec(cursor).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decode a cursor token, rejecting malformed and expired tokens.
///
/// Every failure collapses into the same error so callers learn nothing
/// about the token layout.
pub fn decode_cursor(token: &str, now_ms: i64) -> Result<Cursor, ValidationError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|_| ValidationError::InvalidCursor)?;
    let cursor: Cursor =
        serde_json::from_slice(&bytes).map_err(|_| ValidationError::InvalidCursor)?;

    if cursor.index > cursor.total {
        return Err(ValidationError::InvalidCursor);
    }
    if cursor.timestamp < 0 || cursor.timestamp > now_ms.saturating_add(CLOCK_SKEW_MS) {
        return Err(ValidationError::InvalidCursor);
    }
    let age = now_ms
        .checked_sub(cursor.timestamp)
        .ok_or(ValidationError::InvalidCursor)?;
    if age > CURSOR_TTL_MS {
        return Err(ValidationError::InvalidCursor);
    }

    Ok(cursor)
}

/// Slice `items` according to `request`, using the current clock
pub fn paginate<T: Clone>(items: &[T], request: &PageRequest) -> Result<Page<T>, ValidationError> {
    paginate_at(items, request, chrono::Utc::now().timestamp_millis())
}

/// Slice `items` according to `request` at a fixed point in time
pub fn paginate_at<T: Clone>(
    items: &[T],
    request: &PageRequest,
    now_ms: i64,
) -> Result<Page<T>, ValidationError> {
    let limit = clamp_limit(request.limit);
    let start = match request.cursor.as_deref() {
        Some(token) => decode_cursor(token, now_ms)?.index,
        None => 0,
    };

    let len = items.len();
    let start = start.min(len);
    let end = start.saturating_add(limit).min(len);

    let next_cursor = (end < len).then(|| {
        encode_cursor(&Cursor {
            index: end,
            total: len,
            timestamp: now_ms,
        })
    });

    Ok(Page {
        items: items[start..end].to_vec(),
        next_cursor,
    })
}
