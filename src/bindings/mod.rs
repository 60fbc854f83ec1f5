//! # Platform Bindings
//!
//! The demo endpoints depend on four managed services, each reached through a
//! binding declared in `wrangler.toml`. This module describes the operations
//! the handlers actually use as traits, so handlers are written against the
//! capability rather than the concrete `worker` type.
//!
//! - [`ModelRuntime`]: Workers AI, `run(model, input)`
//! - [`DocumentStore`]: D1, prepared statements with `run`/`all`
//! - [`KeyValueStore`]: KV, `get`/`put`/`delete`
//! - [`ObjectStore`]: R2, `get`/`put`/`delete`/`list`
//!
//! A [`Bindings`] value is assembled per request. A binding that is not
//! configured for the deployment is simply absent, and asking for it yields
//! [`AppError::BindingUnavailable`] before any call is made.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::{AppError, AppResult};

pub mod cloudflare;
#[cfg(test)]
pub mod memory;

#[async_trait(?Send)]
pub trait ModelRuntime {
    async fn run(&self, model: &str, input: Value) -> AppResult<Value>;
}

/// A positional parameter bound to a prepared statement.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementMeta {
    pub last_row_id: Option<i64>,
    pub rows_written: Option<u64>,
    pub changes: Option<u64>,
    pub duration_ms: Option<f64>,
}

impl StatementMeta {
    /// Rows touched by the statement, preferring `rows_written` over `changes`.
    pub fn affected_rows(&self) -> Option<u64> {
        self.rows_written.or(self.changes)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementOutcome {
    pub success: bool,
    pub meta: StatementMeta,
}

#[async_trait(?Send)]
pub trait DocumentStore {
    /// Executes a statement for its side effects.
    async fn run(&self, sql: &str, params: &[SqlValue]) -> AppResult<StatementOutcome>;

    /// Executes a query and returns every row as a JSON object.
    async fn all(&self, sql: &str, params: &[SqlValue]) -> AppResult<Vec<Value>>;
}

#[async_trait(?Send)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Metadata of a stored object. Bodies are never returned to clients.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub etag: String,
    pub uploaded: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub custom_metadata: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutOptions {
    pub content_type: String,
    pub custom_metadata: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectListing {
    pub objects: Vec<ObjectInfo>,
    pub truncated: bool,
}

#[async_trait(?Send)]
pub trait ObjectStore {
    async fn get(&self, key: &str) -> AppResult<Option<ObjectInfo>>;
    async fn put(&self, key: &str, data: Vec<u8>, options: PutOptions) -> AppResult<ObjectInfo>;
    async fn delete(&self, key: &str) -> AppResult<()>;
    async fn list(&self, limit: u32) -> AppResult<ObjectListing>;
}

/// The four kinds of binding a handler may require.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Ai,
    Database,
    KeyValue,
    Bucket,
}

impl BindingKind {
    /// Service name used in the 503 body.
    pub fn service(self) -> &'static str {
        match self {
            BindingKind::Ai => "Workers AI",
            BindingKind::Database => "D1",
            BindingKind::KeyValue => "KV",
            BindingKind::Bucket => "R2",
        }
    }

    pub fn setup_hint(self) -> &'static str {
        match self {
            BindingKind::Ai => "Add [ai] binding to wrangler.toml",
            BindingKind::Database => {
                "Run scripts/setup.sh and update wrangler.toml with your database_id"
            }
            BindingKind::KeyValue => {
                "Run scripts/setup.sh and update wrangler.toml with your namespace IDs"
            }
            BindingKind::Bucket => {
                "Run scripts/setup.sh and update wrangler.toml with your bucket binding"
            }
        }
    }

    fn unavailable(self) -> AppError {
        AppError::BindingUnavailable {
            service: self.service(),
            hint: self.setup_hint(),
        }
    }
}

/// The bindings configured for the current deployment.
#[derive(Default)]
pub struct Bindings {
    ai: Option<Box<dyn ModelRuntime>>,
    database: Option<Box<dyn DocumentStore>>,
    kv: Option<Box<dyn KeyValueStore>>,
    bucket: Option<Box<dyn ObjectStore>>,
}

impl Bindings {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_ai(mut self, ai: impl ModelRuntime + 'static) -> Self {
        self.ai = Some(Box::new(ai));
        self
    }

    pub fn with_database(mut self, db: impl DocumentStore + 'static) -> Self {
        self.database = Some(Box::new(db));
        self
    }

    pub fn with_kv(mut self, kv: impl KeyValueStore + 'static) -> Self {
        self.kv = Some(Box::new(kv));
        self
    }

    pub fn with_bucket(mut self, bucket: impl ObjectStore + 'static) -> Self {
        self.bucket = Some(Box::new(bucket));
        self
    }

    pub fn has_binding(&self, kind: BindingKind) -> bool {
        match kind {
            BindingKind::Ai => self.ai.is_some(),
            BindingKind::Database => self.database.is_some(),
            BindingKind::KeyValue => self.kv.is_some(),
            BindingKind::Bucket => self.bucket.is_some(),
        }
    }

    pub fn ai(&self) -> AppResult<&dyn ModelRuntime> {
        self.ai
            .as_deref()
            .ok_or_else(|| BindingKind::Ai.unavailable())
    }

    pub fn database(&self) -> AppResult<&dyn DocumentStore> {
        self.database
            .as_deref()
            .ok_or_else(|| BindingKind::Database.unavailable())
    }

    pub fn kv(&self) -> AppResult<&dyn KeyValueStore> {
        self.kv
            .as_deref()
            .ok_or_else(|| BindingKind::KeyValue.unavailable())
    }

    pub fn bucket(&self) -> AppResult<&dyn ObjectStore> {
        self.bucket
            .as_deref()
            .ok_or_else(|| BindingKind::Bucket.unavailable())
    }
}
