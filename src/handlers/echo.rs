use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{ApiRequest, ApiResponse};
use crate::errors::{AppError, AppResult};
use crate::middleware::ValidationMiddleware;
use crate::utils::iso_timestamp;

const PROCESSED_BY: &str = "Cloudflare Worker";

/// Server-side transformations of the echoed `text` field. All `None` when
/// `text` is absent or not a string.
#[derive(Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transformations {
    pub uppercase: Option<String>,
    pub reversed: Option<String>,
    pub word_count: Option<usize>,
    pub char_count: Option<usize>,
}

impl Transformations {
    pub fn of(text: Option<&str>) -> Self {
        match text {
            Some(text) => Self {
                uppercase: Some(text.to_uppercase()),
                reversed: Some(text.chars().rev().collect()),
                word_count: Some(text.split_whitespace().count()),
                char_count: Some(text.chars().count()),
            },
            None => Self::default(),
        }
    }
}

/// `POST /api/demo/echo`: returns the body alongside a few transformations.
pub async fn echo(req: &ApiRequest) -> AppResult<ApiResponse> {
    let body: Value = ValidationMiddleware::parse_json(&req.body)?;
    if body.is_null() {
        return Err(AppError::bad_request("Invalid JSON body"));
    }
    let transformations = Transformations::of(body.get("text").and_then(Value::as_str));

    Ok(ApiResponse::ok(json!({
        "received": body,
        "transformations": transformations,
        "processedAt": iso_timestamp(Utc::now()),
        "processedBy": PROCESSED_BY,
    })))
}
