//! # Middleware Components
//!
//! This module provides middleware components for request/response processing
//! in the demo endpoints. Middleware components handle cross-cutting
//! concerns such as CORS and input validation.
//!
//! ## Middleware Types
//!
//! - **CORS Middleware**: Answers preflight requests and decorates responses
//! - **Validation Middleware**: Decodes bodies and query parameters into typed values
//!
//! ## Usage Examples
//!
//! ```rust
//! // Handle CORS preflight
//! if req.method == Method::Options {
//!     return CorsMiddleware::handle_preflight(policy);
//! }
//!
//! // Decode a JSON body
//! let body: GuestbookPost = ValidationMiddleware::parse_json(&req.body)?;
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::ApiResponse;
use crate::constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_ORIGIN};
use crate::errors::{AppError, AppResult};

/// Cross-origin policy of a single endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Value of `Access-Control-Allow-Methods`.
    pub allow_methods: &'static str,
    /// Whether regular responses (not only preflight) declare the allowed
    /// methods and headers. State-mutating endpoints do.
    pub full_on_responses: bool,
}

impl CorsPolicy {
    pub const fn read_only() -> Self {
        Self {
            allow_methods: "GET, OPTIONS",
            full_on_responses: false,
        }
    }

    pub const fn post_only(full_on_responses: bool) -> Self {
        Self {
            allow_methods: "POST, OPTIONS",
            full_on_responses,
        }
    }

    pub const fn crud() -> Self {
        Self {
            allow_methods: "GET, POST, DELETE, OPTIONS",
            full_on_responses: true,
        }
    }
}

/// Middleware for handling Cross-Origin Resource Sharing (CORS) requests.
///
/// Every response allows any origin. Preflight responses also list the
/// endpoint's methods and the `Content-Type` request header.
pub struct CorsMiddleware;

impl CorsMiddleware {
    /// Applies CORS headers to an existing response.
    pub fn apply_headers(response: ApiResponse, policy: CorsPolicy) -> ApiResponse {
        let response = response.with_header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN);
        if policy.full_on_responses {
            Self::with_method_headers(response, policy)
        } else {
            response
        }
    }

    /// Handles CORS preflight requests (OPTIONS method).
    ///
    /// Returns an empty 200 carrying only the CORS headers.
    pub fn handle_preflight(policy: CorsPolicy) -> ApiResponse {
        let response = ApiResponse::empty()
            .with_header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN);
        Self::with_method_headers(response, policy)
    }

    fn with_method_headers(response: ApiResponse, policy: CorsPolicy) -> ApiResponse {
        response
            .with_header("Access-Control-Allow-Methods", policy.allow_methods)
            .with_header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
    }
}

/// Middleware for validating request bodies and parameters.
///
/// All validation functions return `AppResult<T>` so that failures surface
/// as 400 responses with a short `error` message and no internal detail.
pub struct ValidationMiddleware;

impl ValidationMiddleware {
    /// Decodes a required JSON body.
    ///
    /// # Errors
    ///
    /// - `BadRequest("Invalid JSON body")`: empty, malformed, or wrongly shaped body
    pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
        serde_json::from_slice(body).map_err(|_| AppError::bad_request("Invalid JSON body"))
    }

    /// Decodes an optional JSON body.
    ///
    /// Empty or malformed bodies yield `T::default()`. Well-formed JSON that
    /// does not fit `T` is rejected with `schema_error`.
    pub fn parse_optional_json<T: DeserializeOwned + Default>(
        body: &[u8],
        schema_error: &str,
    ) -> AppResult<T> {
        let Ok(value) = serde_json::from_slice::<Value>(body) else {
            return Ok(T::default());
        };
        serde_json::from_value(value).map_err(|_| AppError::bad_request(schema_error))
    }

    /// Parses an integer query parameter the lenient way browsers' `parseInt`
    /// does: surrounding whitespace and trailing garbage are ignored.
    pub fn int_param(raw: Option<&str>) -> Option<i64> {
        let raw = raw?.trim_start();
        let (sign, digits) = match raw.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        digits[..end].parse::<i64>().ok().map(|n| sign * n)
    }

    /// Validates that a decoded upload is within the configured limit.
    ///
    /// # Errors
    ///
    /// - `BadRequest`: If the size exceeds the maximum, naming the limit in KB
    pub fn validate_upload_size(size: usize, max_size: usize) -> AppResult<()> {
        if size > max_size {
            return Err(AppError::bad_request(format!(
                "File too large. Max size is {}KB for demo.",
                max_size / 1024
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Update {
        set: Option<i64>,
    }

    #[test]
    fn preflight_is_empty_with_method_headers() {
        let response = CorsMiddleware::handle_preflight(CorsPolicy::crud());
        assert_eq!(response.status, http::StatusCode::OK);
        assert!(response.body.is_none());
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("GET, POST, DELETE, OPTIONS")
        );
        assert_eq!(response.header("Access-Control-Allow-Headers"), Some("Content-Type"));
    }

    #[test]
    fn read_only_responses_carry_origin_only() {
        let response = CorsMiddleware::apply_headers(
            ApiResponse::ok(serde_json::json!({})),
            CorsPolicy::read_only(),
        );
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(response.header("Access-Control-Allow-Methods"), None);
    }

    #[test]
    fn parse_json_rejects_malformed_body() {
        let err = ValidationMiddleware::parse_json::<Value>(b"{not json").unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn optional_json_tolerates_missing_body_but_not_wrong_shape() {
        let empty: Update = ValidationMiddleware::parse_optional_json(b"", "bad").unwrap();
        assert_eq!(empty, Update::default());

        let garbage: Update = ValidationMiddleware::parse_optional_json(b"nope", "bad").unwrap();
        assert_eq!(garbage, Update::default());

        let err = ValidationMiddleware::parse_optional_json::<Update>(br#"{"set":"ten"}"#, "bad")
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn int_param_follows_parse_int() {
        assert_eq!(ValidationMiddleware::int_param(Some("42")), Some(42));
        assert_eq!(ValidationMiddleware::int_param(Some(" 7px")), Some(7));
        assert_eq!(ValidationMiddleware::int_param(Some("-3")), Some(-3));
        assert_eq!(ValidationMiddleware::int_param(Some("abc")), None);
        assert_eq!(ValidationMiddleware::int_param(None), None);
    }

    #[test]
    fn validate_upload_size_allows_within_limit() {
        assert!(ValidationMiddleware::validate_upload_size(102_400, 102_400).is_ok());
    }

    #[test]
    fn validate_upload_size_rejects_over_limit() {
        let err = ValidationMiddleware::validate_upload_size(102_401, 102_400).unwrap_err();
        let body = err.to_response().body.unwrap();
        assert_eq!(body["error"], "File too large. Max size is 100KB for demo.");
    }
}
