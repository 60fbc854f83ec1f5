//! # Random Data Demo
//!
//! `GET /api/demo/random?type=&count=&min=&max=` generates a batch of random
//! values locally. Responses are marked `no-store` so caches never serve a
//! stale batch.

use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiRequest, ApiResponse};
use crate::config::Config;
use crate::errors::AppResult;
use crate::middleware::ValidationMiddleware;
use crate::utils::iso_timestamp;

const DEFAULT_COUNT: i64 = 5;
const DEFAULT_MIN: i64 = 1;
const DEFAULT_MAX: i64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RandomKind {
    Numbers { min: i64, max: i64 },
    Uuid,
    Hex,
    Dice,
    Coin,
}

impl RandomKind {
    /// Resolves the `type` parameter. Unknown or missing types generate numbers.
    pub fn from_request(req: &ApiRequest) -> Self {
        match req.query("type").as_deref() {
            Some("uuid") => RandomKind::Uuid,
            Some("hex") => RandomKind::Hex,
            Some("dice") => RandomKind::Dice,
            Some("coin") => RandomKind::Coin,
            _ => {
                let bound = |name: &str, default: i64| {
                    ValidationMiddleware::int_param(req.query(name).as_deref())
                        .filter(|n| *n != 0)
                        .unwrap_or(default)
                };
                let (min, max) = (bound("min", DEFAULT_MIN), bound("max", DEFAULT_MAX));
                RandomKind::Numbers {
                    min: min.min(max),
                    max: min.max(max),
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RandomKind::Numbers { .. } => "numbers",
            RandomKind::Uuid => "uuid",
            RandomKind::Hex => "hex",
            RandomKind::Dice => "dice",
            RandomKind::Coin => "coin",
        }
    }

    fn sample<R: Rng>(self, rng: &mut R) -> Value {
        match self {
            RandomKind::Numbers { min, max } => json!(rng.gen_range(min..=max)),
            RandomKind::Uuid => json!(Uuid::new_v4().to_string()),
            RandomKind::Hex => json!(hex::encode(rng.gen::<[u8; 16]>())),
            RandomKind::Dice => json!(rng.gen_range(1..=6)),
            RandomKind::Coin => json!(if rng.gen_bool(0.5) { "heads" } else { "tails" }),
        }
    }
}

/// Number of values to generate: `count`, defaulting to 5, kept within
/// `1..=max_count`.
pub fn batch_size(req: &ApiRequest, max_count: usize) -> usize {
    let requested = ValidationMiddleware::int_param(req.query("count").as_deref())
        .filter(|n| *n != 0)
        .unwrap_or(DEFAULT_COUNT);
    usize::try_from(requested.max(1))
        .unwrap_or(max_count)
        .min(max_count)
}

pub async fn generate(req: &ApiRequest, config: &Config) -> AppResult<ApiResponse> {
    let kind = RandomKind::from_request(req);
    let requested = req
        .query("type")
        .filter(|kind| !kind.is_empty())
        .unwrap_or_else(|| kind.name().to_string());
    let count = batch_size(req, config.random_max_count);

    let mut rng = rand::thread_rng();
    let data: Vec<Value> = (0..count).map(|_| kind.sample(&mut rng)).collect();

    Ok(ApiResponse::ok(json!({
        "type": requested,
        "count": data.len(),
        "data": data,
        "generatedAt": iso_timestamp(Utc::now()),
    }))
    .with_header("Cache-Control", "no-store"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use worker::Method;

    fn get(query: &str) -> ApiRequest {
        ApiRequest::new(Method::Get, &format!("https://demo.dev/api/demo/random{}", query)).unwrap()
    }

    fn call(query: &str) -> ApiResponse {
        block_on(generate(&get(query), &Config::default())).unwrap()
    }

    #[test]
    fn coin_flips_are_heads_or_tails() {
        let body = call("?type=coin&count=3").body.unwrap();
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert!(data.iter().all(|v| v == "heads" || v == "tails"));
        assert_eq!(body["type"], "coin");
    }

    #[test]
    fn count_is_clamped() {
        assert_eq!(call("?count=500").body.unwrap()["count"], 100);
        assert_eq!(call("?count=-4").body.unwrap()["count"], 1);
        assert_eq!(call("").body.unwrap()["count"], 5);
    }

    #[test]
    fn numbers_stay_within_bounds() {
        let body = call("?min=10&max=12&count=50").body.unwrap();
        for value in body["data"].as_array().unwrap() {
            let n = value.as_i64().unwrap();
            assert!((10..=12).contains(&n));
        }
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        assert_eq!(
            RandomKind::from_request(&get("?min=9&max=3")),
            RandomKind::Numbers { min: 3, max: 9 }
        );
    }

    #[test]
    fn unknown_type_generates_numbers_under_requested_name() {
        let body = call("?type=emoji&count=3").body.unwrap();
        assert_eq!(body["type"], "emoji");
        assert!(body["data"].as_array().unwrap().iter().all(|v| v.is_i64()));
        assert_eq!(call("").body.unwrap()["type"], "numbers");
    }

    #[test]
    fn hex_and_uuid_shapes() {
        let hex = call("?type=hex&count=1").body.unwrap();
        assert_eq!(hex["data"][0].as_str().unwrap().len(), 32);

        let uuid = call("?type=uuid&count=1").body.unwrap();
        assert!(Uuid::parse_str(uuid["data"][0].as_str().unwrap()).is_ok());
    }

    #[test]
    fn dice_rolls_one_to_six() {
        let body = call("?type=dice&count=100").body.unwrap();
        assert!(body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|v| (1..=6).contains(&v.as_i64().unwrap())));
    }

    #[test]
    fn response_is_not_cacheable() {
        assert_eq!(call("").header("Cache-Control"), Some("no-store"));
    }
}
