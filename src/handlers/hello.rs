use chrono::Utc;
use serde_json::json;

use crate::api::{ApiRequest, ApiResponse};
use crate::errors::AppResult;
use crate::utils::iso_timestamp;

/// `GET /api/hello?name=`: a greeting, defaulting to "World".
pub async fn hello(req: &ApiRequest) -> AppResult<ApiResponse> {
    let name = req
        .query("name")
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "World".to_string());

    Ok(ApiResponse::ok(json!({
        "message": format!("Hello, {}!", name),
        "timestamp": iso_timestamp(Utc::now()),
        "method": req.method.to_string(),
    })))
}
