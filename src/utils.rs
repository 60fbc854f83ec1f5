//! # Utility Functions
//!
//! This module provides utility functions used throughout the demo endpoints.
//!
//! ## Core Utilities
//!
//! - **Object Names**: Reduces client-supplied file names to a safe key
//! - **Content Decoding**: Turns uploaded text or base64 into bytes
//! - **Truncation**: Character-based limits for guestbook and AI input
//! - **Timestamps**: The ISO-8601 and HTTP-date forms returned by the endpoints
//! - **Request IDs**: Identifiers for log correlation
//!
//! ## Example Usage
//!
//! ```rust
//! let key = sanitize_object_name("a b?.txt");
//! // Result: "a_b_.txt"
//!
//! let bytes = decode_content("aGVsbG8=", true)?;
//! // Result: b"hello"
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::constants::MAX_OBJECT_NAME_CHARS;
use crate::errors::{AppError, AppResult};

/// Sanitizes a file name into an object key.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_`, and the result is
/// cut to 100 characters. Path separators are replaced like any other
/// character, so keys never nest.
///
/// # Example
///
/// ```rust
/// assert_eq!(sanitize_object_name("../etc/passwd"), ".._etc_passwd");
/// ```
pub fn sanitize_object_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_OBJECT_NAME_CHARS)
        .collect()
}

/// Decodes uploaded file content.
///
/// Content is either base64 (standard alphabet, padding optional, ASCII
/// whitespace ignored) or plain text stored as UTF-8.
///
/// # Errors
///
/// - `BadRequest("Invalid content encoding")`: If base64 decoding fails
pub fn decode_content(content: &str, is_base64: bool) -> AppResult<Vec<u8>> {
    if !is_base64 {
        return Ok(content.as_bytes().to_vec());
    }

    let compact: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let padded = match compact.len() % 4 {
        2 => format!("{}==", compact),
        3 => format!("{}=", compact),
        _ => compact,
    };

    BASE64
        .decode(padded.as_bytes())
        .map_err(|_| AppError::bad_request("Invalid content encoding"))
}

/// Returns at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// ISO-8601 with millisecond precision, e.g. `2024-01-15T10:30:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// HTTP-date form, e.g. `Mon, 15 Jan 2024 10:30:00 GMT`.
pub fn utc_string(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Generates a unique identifier for log correlation.
///
/// Format: `{timestamp}-{uuid}`, where the timestamp is UTC milliseconds.
pub fn generate_request_id() -> String {
    let uuid_part = Uuid::new_v4().to_string();
    let timestamp = Utc::now().timestamp_millis();
    format!("{}-{}", timestamp, uuid_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_object_name("a b?.txt"), "a_b_.txt");
        assert_eq!(sanitize_object_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_object_name("résumé.pdf"), "r_sum_.pdf");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "x".repeat(250);
        assert_eq!(sanitize_object_name(&long).len(), 100);
    }

    #[test]
    fn decode_plain_text_as_utf8() {
        assert_eq!(decode_content("héllo", false).unwrap(), "héllo".as_bytes());
    }

    #[test]
    fn decode_base64_tolerates_whitespace_and_missing_padding() {
        assert_eq!(decode_content("aGVs\nbG8", true).unwrap(), b"hello");
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let err = decode_content("***", true).unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn timestamp_formats() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-01-15T10:30:00.000Z");
        assert_eq!(utc_string(at), "Mon, 15 Jan 2024 10:30:00 GMT");
    }
}
