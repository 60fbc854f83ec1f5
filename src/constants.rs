//! # Application Constants
//!
//! This module defines application-wide constants used throughout the demo endpoints.
//! Centralizing constants keeps the binding names in step with `wrangler.toml` and
//! keeps the per-endpoint limits in one place.
//!
//! ## Binding Names
//!
//! Constants for Cloudflare Worker bindings that must match wrangler.toml configuration.
//!
//! ## Limits
//!
//! Default size limits and caps applied at the request boundary.
//!
//! ## Headers
//!
//! CORS header values shared by every endpoint.

/// KV namespace holding optional configuration overrides
pub const DEMO_CONFIG_KV_NAME: &str = "DEMO_CONFIG";

/// Key under which the configuration JSON is stored
pub const DEMO_CONFIG_KEY: &str = "config";

/// Workers AI binding name
pub const AI_BINDING_NAME: &str = "AI";

/// D1 database binding name for the guestbook
pub const DB_BINDING_NAME: &str = "DB";

/// KV namespace binding name for the counter
pub const KV_BINDING_NAME: &str = "DEMO_KV";

/// R2 bucket binding name for uploaded demo files
pub const BUCKET_BINDING_NAME: &str = "DEMO_BUCKET";

/// Maximum upload size for the storage demo (100KB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024;

/// Number of objects returned when listing the bucket
pub const DEFAULT_OBJECT_LIST_LIMIT: u32 = 20;

/// Number of guestbook entries returned when no `limit` is given
pub const DEFAULT_GUESTBOOK_LIMIT: u32 = 10;

/// Upper bound for `count` on the random endpoint
pub const DEFAULT_RANDOM_MAX_COUNT: usize = 100;

/// Longest object name accepted after sanitizing
pub const MAX_OBJECT_NAME_CHARS: usize = 100;

/// Guestbook field limits
pub const MAX_GUESTBOOK_NAME_CHARS: usize = 100;
pub const MAX_GUESTBOOK_MESSAGE_CHARS: usize = 500;

/// Counter keys in the KV namespace
pub const COUNTER_KEY: &str = "demo_counter";
pub const COUNTER_METADATA_KEY: &str = "demo_counter_meta";

/// Header carrying the Cloudflare request id
pub const HEADER_CF_RAY: &str = "cf-ray";

/// CORS header for allowed origins
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// CORS header for allowed headers
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Name reported by the health endpoint
pub const SERVICE_NAME: &str = "edge-demos-cf-workers";
