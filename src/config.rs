//! # Configuration Management
//!
//! This module provides configuration management for the demo endpoints.
//! Configuration is optionally stored in Cloudflare KV storage and loaded at runtime
//! with defaults for every setting.
//!
//! ## Configuration Sources
//!
//! 1. **KV Storage**: JSON stored under the "config" key of the `DEMO_CONFIG` namespace
//! 2. **Defaults**: Used when the namespace is not bound, the key is empty, or a field is omitted
//!
//! ## Configuration Options
//!
//! - `ai_binding`, `database_binding`, `kv_binding`, `bucket_binding`: binding names
//! - `max_upload_bytes`: largest file accepted by the storage demo (default: 100KB)
//! - `object_list_limit`: objects returned when listing the bucket (default: 20)
//! - `guestbook_default_limit`: entries returned when `limit` is absent (default: 10)
//! - `random_max_count`: cap for `count` on the random endpoint (default: 100)
//!
//! ## Example
//!
//! ```rust
//! let config = Config::load(&env).await?;
//! println!("Max upload size: {} bytes", config.max_upload_bytes);
//! ```

use crate::constants::{
    AI_BINDING_NAME, BUCKET_BINDING_NAME, DB_BINDING_NAME, DEFAULT_GUESTBOOK_LIMIT,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_OBJECT_LIST_LIMIT, DEFAULT_RANDOM_MAX_COUNT,
    DEMO_CONFIG_KEY, DEMO_CONFIG_KV_NAME, KV_BINDING_NAME,
};
use serde::{Deserialize, Serialize};
use worker::{console_log, Env, Result};

/// Configuration structure for the demo endpoints.
///
/// Every field has a default so that a partial JSON document in KV only
/// overrides the settings it names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the Workers AI binding.
    pub ai_binding: String,

    /// Name of the D1 binding holding the guestbook table.
    pub database_binding: String,

    /// Name of the KV namespace binding holding the counter.
    pub kv_binding: String,

    /// Name of the R2 bucket binding for uploaded files.
    pub bucket_binding: String,

    /// Maximum decoded upload size in bytes.
    pub max_upload_bytes: usize,

    /// Number of objects returned by a bucket listing.
    pub object_list_limit: u32,

    /// Number of guestbook entries returned when `limit` is absent or invalid.
    pub guestbook_default_limit: u32,

    /// Upper bound for the random endpoint's `count`.
    pub random_max_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_binding: AI_BINDING_NAME.to_string(),
            database_binding: DB_BINDING_NAME.to_string(),
            kv_binding: KV_BINDING_NAME.to_string(),
            bucket_binding: BUCKET_BINDING_NAME.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            object_list_limit: DEFAULT_OBJECT_LIST_LIMIT,
            guestbook_default_limit: DEFAULT_GUESTBOOK_LIMIT,
            random_max_count: DEFAULT_RANDOM_MAX_COUNT,
        }
    }
}

impl Config {
    /// Loads configuration from KV storage with fallback to defaults.
    ///
    /// The `DEMO_CONFIG` namespace is optional. When it is not bound, or holds
    /// no "config" key, the defaults are used.
    ///
    /// # Configuration Format
    ///
    /// ```json
    /// {
    ///   "max_upload_bytes": 102400,
    ///   "object_list_limit": 20,
    ///   "kv_binding": "DEMO_KV"
    /// }
    /// ```
    ///
    /// # Error Handling
    ///
    /// - A missing namespace or key yields the defaults
    /// - KV read failures and invalid JSON are propagated
    pub async fn load(env: &Env) -> Result<Self> {
        let Ok(kv) = env.kv(DEMO_CONFIG_KV_NAME) else {
            console_log!("{} not bound, using default config", DEMO_CONFIG_KV_NAME);
            return Ok(Self::default());
        };

        match kv.get(DEMO_CONFIG_KEY).json::<Config>().await? {
            Some(config) => {
                console_log!("Configuration loaded from KV storage");
                Ok(config)
            }
            None => {
                console_log!("Config not found in KV, using default");
                Ok(Self::default())
            }
        }
    }
}
