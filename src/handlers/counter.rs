//! # KV Counter Demo
//!
//! `GET|POST|DELETE /api/demo/kv` reads, updates and resets a counter kept in
//! Workers KV next to a small metadata record.
//!
//! Updates are a plain read-then-write. KV offers no compare-and-swap, so two
//! concurrent POSTs can both read the same value and one increment is lost.

use chrono::Utc;
use serde_json::json;

use crate::api::{ApiRequest, ApiResponse};
use crate::bindings::{Bindings, KeyValueStore};
use crate::constants::{COUNTER_KEY, COUNTER_METADATA_KEY};
use crate::errors::{AppError, AppResult};
use crate::middleware::ValidationMiddleware;
use crate::models::{CounterMetadata, CounterUpdate};
use crate::utils::iso_timestamp;
use worker::Method;

const ERROR_LABEL: &str = "KV error";
const STORAGE: &str = "KV (Key-Value)";

pub async fn handle(req: &ApiRequest, bindings: &Bindings) -> AppResult<ApiResponse> {
    let kv = bindings.kv()?;

    let result = match req.method {
        Method::Get => read(kv).await,
        Method::Post => update(req, kv).await,
        Method::Delete => reset(kv).await,
        _ => Err(AppError::method_not_allowed("Method not allowed")),
    };
    result.map_err(|e| e.upstream(ERROR_LABEL))
}

/// Computes the value a POST stores. An explicit `set` wins; otherwise the
/// counter moves by `increment`, where an absent or zero increment means 1.
pub fn next_value(current: i64, update: &CounterUpdate) -> i64 {
    match update.set {
        Some(value) => value,
        None => {
            let increment = update.increment.filter(|n| *n != 0).unwrap_or(1);
            current.saturating_add(increment)
        }
    }
}

async fn current_value(kv: &dyn KeyValueStore) -> AppResult<i64> {
    let raw = kv.get(COUNTER_KEY).await?;
    Ok(ValidationMiddleware::int_param(raw.as_deref()).unwrap_or(0))
}

async fn metadata(kv: &dyn KeyValueStore) -> AppResult<Option<CounterMetadata>> {
    match kv.get(COUNTER_METADATA_KEY).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

async fn read(kv: &dyn KeyValueStore) -> AppResult<ApiResponse> {
    let counter = current_value(kv).await?;
    let metadata = metadata(kv).await?.unwrap_or_default();

    Ok(ApiResponse::ok(json!({
        "counter": counter,
        "metadata": metadata,
        "storage": STORAGE,
    })))
}

async fn update(req: &ApiRequest, kv: &dyn KeyValueStore) -> AppResult<ApiResponse> {
    let update: CounterUpdate =
        ValidationMiddleware::parse_optional_json(&req.body, "increment and set must be integers")?;

    let previous = current_value(kv).await?;
    let counter = next_value(previous, &update);

    let now = iso_timestamp(Utc::now());
    let metadata = metadata(kv).await?.unwrap_or_default().touch(&now);

    kv.put(COUNTER_KEY, &counter.to_string()).await?;
    kv.put(COUNTER_METADATA_KEY, &serde_json::to_string(&metadata)?)
        .await?;

    Ok(ApiResponse::ok(json!({
        "counter": counter,
        "previousValue": previous,
        "change": counter.saturating_sub(previous),
        "metadata": metadata,
    })))
}

async fn reset(kv: &dyn KeyValueStore) -> AppResult<ApiResponse> {
    kv.delete(COUNTER_KEY).await?;
    kv.delete(COUNTER_METADATA_KEY).await?;

    Ok(ApiResponse::ok(json!({
        "success": true,
        "message": "Counter reset to 0",
        "counter": 0,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::memory::MemoryKv;
    use futures::executor::block_on;
    use http::StatusCode;

    fn request(method: Method) -> ApiRequest {
        ApiRequest::new(method, "https://demo.dev/api/demo/kv").unwrap()
    }

    fn call(bindings: &Bindings, req: ApiRequest) -> serde_json::Value {
        block_on(handle(&req, bindings)).unwrap().body.unwrap()
    }

    #[test]
    fn first_post_starts_from_zero() {
        let bindings = Bindings::empty().with_kv(MemoryKv::default());
        let body = call(&bindings, request(Method::Post).with_json(&json!({})));

        assert_eq!(body["counter"], 1);
        assert_eq!(body["previousValue"], 0);
        assert_eq!(body["change"], 1);
        assert_eq!(body["metadata"]["updateCount"], 1);
    }

    #[test]
    fn post_without_body_increments() {
        let bindings = Bindings::empty().with_kv(MemoryKv::default());
        call(&bindings, request(Method::Post));
        let body = call(&bindings, request(Method::Post));
        assert_eq!(body["counter"], 2);
    }

    #[test]
    fn set_overrides_prior_value() {
        let kv = MemoryKv::default();
        let bindings = Bindings::empty().with_kv(kv.clone());
        call(&bindings, request(Method::Post).with_json(&json!({ "increment": 5 })));

        let body = call(&bindings, request(Method::Post).with_json(&json!({ "set": 10, "increment": 3 })));
        assert_eq!(body["counter"], 10);
        assert_eq!(body["previousValue"], 5);
        assert_eq!(body["change"], 5);
        assert_eq!(kv.entries.borrow().get(COUNTER_KEY).map(String::as_str), Some("10"));
    }

    #[test]
    fn delete_then_get_reads_zero() {
        let bindings = Bindings::empty().with_kv(MemoryKv::default());
        call(&bindings, request(Method::Post).with_json(&json!({ "set": 42 })));

        let body = call(&bindings, request(Method::Delete));
        assert_eq!(body["message"], "Counter reset to 0");

        let body = call(&bindings, request(Method::Get));
        assert_eq!(body["counter"], 0);
        assert_eq!(body["metadata"], json!({ "created": null, "lastUpdated": null }));
        assert_eq!(body["storage"], "KV (Key-Value)");
    }

    #[test]
    fn zero_increment_counts_as_one() {
        assert_eq!(next_value(4, &CounterUpdate { increment: Some(0), set: None }), 5);
        assert_eq!(next_value(4, &CounterUpdate { increment: Some(-2), set: None }), 2);
    }

    #[test]
    fn non_integer_update_is_rejected() {
        let bindings = Bindings::empty().with_kv(MemoryKv::default());
        let req = request(Method::Post).with_json(&json!({ "set": "ten" }));
        let err = block_on(handle(&req, &bindings)).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_namespace_is_503() {
        let err = block_on(handle(&request(Method::Get), &Bindings::empty())).unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
