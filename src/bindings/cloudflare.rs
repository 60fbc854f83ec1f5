//! Binding traits implemented for the `worker` crate's service handles.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use worker::d1::D1Database;
use worker::kv::KvStore;
use worker::wasm_bindgen::JsValue;
use worker::{Ai, Bucket, Env, HttpMetadata, Object};

use super::{
    Bindings, DocumentStore, KeyValueStore, ModelRuntime, ObjectInfo, ObjectListing, ObjectStore,
    PutOptions, SqlValue, StatementMeta, StatementOutcome,
};
use crate::config::Config;
use crate::errors::AppResult;

impl Bindings {
    /// Collects whichever bindings the deployment has configured.
    ///
    /// Lookup failures mean "not bound" and leave the slot empty.
    pub fn from_env(env: &Env, config: &Config) -> Self {
        let mut bindings = Bindings::empty();
        if let Ok(ai) = env.ai(&config.ai_binding) {
            bindings = bindings.with_ai(ai);
        }
        if let Ok(db) = env.d1(&config.database_binding) {
            bindings = bindings.with_database(db);
        }
        if let Ok(kv) = env.kv(&config.kv_binding) {
            bindings = bindings.with_kv(kv);
        }
        if let Ok(bucket) = env.bucket(&config.bucket_binding) {
            bindings = bindings.with_bucket(bucket);
        }
        bindings
    }
}

#[async_trait(?Send)]
impl ModelRuntime for Ai {
    async fn run(&self, model: &str, input: Value) -> AppResult<Value> {
        let output: Value = Ai::run(self, model, input).await?;
        Ok(output)
    }
}

fn to_js_values(params: &[SqlValue]) -> Vec<JsValue> {
    params
        .iter()
        .map(|param| match param {
            // D1 rejects BigInt parameters, so integers travel as JS numbers.
            SqlValue::Integer(n) => JsValue::from_f64(*n as f64),
            SqlValue::Text(s) => JsValue::from_str(s),
        })
        .collect()
}

#[async_trait(?Send)]
impl DocumentStore for D1Database {
    async fn run(&self, sql: &str, params: &[SqlValue]) -> AppResult<StatementOutcome> {
        let statement = self.prepare(sql).bind(&to_js_values(params))?;
        let result = statement.run().await?;

        let meta = result
            .meta()?
            .map(|meta| StatementMeta {
                last_row_id: meta.last_row_id,
                rows_written: meta.rows_written.map(|n| n as u64),
                changes: meta.changes.map(|n| n as u64),
                duration_ms: meta.duration,
            })
            .unwrap_or_default();

        Ok(StatementOutcome {
            success: result.success(),
            meta,
        })
    }

    async fn all(&self, sql: &str, params: &[SqlValue]) -> AppResult<Vec<Value>> {
        let statement = self.prepare(sql).bind(&to_js_values(params))?;
        let rows = statement.all().await?.results::<Value>()?;
        Ok(rows)
    }
}

#[async_trait(?Send)]
impl KeyValueStore for KvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value = KvStore::get(self, key)
            .text()
            .await
            .map_err(worker::Error::from)?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> AppResult<()> {
        KvStore::put(self, key, value.to_string())
            .map_err(worker::Error::from)?
            .execute()
            .await
            .map_err(worker::Error::from)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        KvStore::delete(self, key)
            .await
            .map_err(worker::Error::from)?;
        Ok(())
    }
}

fn object_info(object: &Object) -> AppResult<ObjectInfo> {
    Ok(ObjectInfo {
        key: object.key(),
        size: object.size() as u64,
        etag: object.etag(),
        uploaded: DateTime::<Utc>::from_timestamp_millis(object.uploaded().as_millis() as i64),
        content_type: object.http_metadata().content_type,
        custom_metadata: object.custom_metadata()?.into_iter().collect(),
    })
}

#[async_trait(?Send)]
impl ObjectStore for Bucket {
    async fn get(&self, key: &str) -> AppResult<Option<ObjectInfo>> {
        match Bucket::get(self, key).execute().await? {
            Some(object) => Ok(Some(object_info(&object)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>, options: PutOptions) -> AppResult<ObjectInfo> {
        let custom_metadata: HashMap<String, String> =
            options.custom_metadata.into_iter().collect();

        let object = Bucket::put(self, key, data)
            .http_metadata(HttpMetadata {
                content_type: Some(options.content_type),
                ..Default::default()
            })
            .custom_metadata(custom_metadata)
            .execute()
            .await?;

        object_info(&object)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        Bucket::delete(self, key).await?;
        Ok(())
    }

    async fn list(&self, limit: u32) -> AppResult<ObjectListing> {
        let listed = Bucket::list(self).limit(limit).execute().await?;
        let objects = listed
            .objects()
            .iter()
            .map(object_info)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ObjectListing {
            objects,
            truncated: listed.truncated(),
        })
    }
}
