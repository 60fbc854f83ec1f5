//! # Handlers Module
//!
//! One module per demo endpoint. Handlers take an [`ApiRequest`], the
//! deployment's [`Bindings`](crate::bindings::Bindings) where they need one,
//! and return `AppResult<ApiResponse>`; the router turns errors into JSON
//! responses and adds CORS headers.

use serde_json::json;

use crate::api::{ApiRequest, ApiResponse};
use crate::constants::SERVICE_NAME;
use crate::errors::{AppError, AppResult};

pub mod ai;
pub mod counter;
pub mod echo;
pub mod guestbook;
pub mod hello;
pub mod info;
pub mod random;
pub mod storage;
pub mod time;

/// Provides a health check endpoint for monitoring and load balancer probes.
pub async fn handle_health_check(_req: &ApiRequest) -> AppResult<ApiResponse> {
    Ok(ApiResponse::ok(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

/// Handles requests to unmatched routes with a 404 Not Found response.
pub fn handle_not_found() -> AppError {
    AppError::NotFound("Not Found".into())
}
