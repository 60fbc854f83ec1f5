use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::api::ApiResponse;
use crate::errors::AppResult;
use crate::utils::{iso_timestamp, utc_string};

pub fn time_body(now: DateTime<Utc>) -> Value {
    json!({
        "iso": iso_timestamp(now),
        "unix": now.timestamp(),
        "utc": utc_string(now),
        "timezone": "UTC",
    })
}

/// `GET /api/demo/time`: the current instant in three formats.
pub async fn current_time() -> AppResult<ApiResponse> {
    Ok(ApiResponse::ok(time_body(Utc::now())))
}
