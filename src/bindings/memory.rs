//! In-memory stand-ins for the platform bindings, used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use super::{
    DocumentStore, KeyValueStore, ModelRuntime, ObjectInfo, ObjectListing, ObjectStore,
    PutOptions, SqlValue, StatementMeta, StatementOutcome,
};
use crate::errors::{AppError, AppResult};

/// Records every model call and answers with a canned result.
#[derive(Clone, Default)]
pub struct RecordingAi {
    pub calls: Rc<RefCell<Vec<(String, Value)>>>,
    pub fail_with: Option<String>,
}

impl RecordingAi {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Rc::default(),
            fail_with: Some(message.to_string()),
        }
    }
}

#[async_trait(?Send)]
impl ModelRuntime for RecordingAi {
    async fn run(&self, model: &str, input: Value) -> AppResult<Value> {
        self.calls.borrow_mut().push((model.to_string(), input));
        match &self.fail_with {
            Some(message) => Err(AppError::Internal(message.clone())),
            None => Ok(json!({ "response": "ok" })),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryKv {
    pub entries: Rc<RefCell<BTreeMap<String, String>>>,
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Understands exactly the statements the guestbook issues.
#[derive(Clone, Default)]
pub struct MemoryGuestbook {
    pub rows: Rc<RefCell<Vec<Value>>>,
    next_id: Rc<Cell<i64>>,
    pub fail_with: Option<String>,
}

impl MemoryGuestbook {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn check(&self) -> AppResult<()> {
        match &self.fail_with {
            Some(message) => Err(AppError::Internal(message.clone())),
            None => Ok(()),
        }
    }
}

fn integer_param(params: &[SqlValue], index: usize) -> i64 {
    match params.get(index) {
        Some(SqlValue::Integer(n)) => *n,
        _ => 0,
    }
}

fn text_param(params: &[SqlValue], index: usize) -> String {
    match params.get(index) {
        Some(SqlValue::Text(s)) => s.clone(),
        _ => String::new(),
    }
}

#[async_trait(?Send)]
impl DocumentStore for MemoryGuestbook {
    async fn run(&self, sql: &str, params: &[SqlValue]) -> AppResult<StatementOutcome> {
        self.check()?;
        let sql = sql.trim_start();

        if sql.starts_with("CREATE TABLE") {
            return Ok(StatementOutcome {
                success: true,
                meta: StatementMeta::default(),
            });
        }

        if sql.starts_with("INSERT") {
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            self.rows.borrow_mut().push(json!({
                "id": id,
                "name": text_param(params, 0),
                "message": text_param(params, 1),
                "created_at": format!("2026-01-01 00:00:{:02}", id % 60),
            }));
            return Ok(StatementOutcome {
                success: true,
                meta: StatementMeta {
                    last_row_id: Some(id),
                    rows_written: Some(1),
                    changes: Some(1),
                    duration_ms: Some(0.5),
                },
            });
        }

        if sql.starts_with("DELETE") {
            let removed = self.rows.borrow_mut().drain(..).count() as u64;
            return Ok(StatementOutcome {
                success: true,
                meta: StatementMeta {
                    changes: Some(removed),
                    ..Default::default()
                },
            });
        }

        Err(AppError::Internal(format!("unsupported statement: {}", sql)))
    }

    async fn all(&self, sql: &str, params: &[SqlValue]) -> AppResult<Vec<Value>> {
        self.check()?;
        let rows = self.rows.borrow();

        if sql.contains("WHERE id = ?") {
            let id = integer_param(params, 0);
            return Ok(rows.iter().filter(|row| row["id"] == id).cloned().collect());
        }

        let limit = integer_param(params, 0).max(0) as usize;
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }
}

#[derive(Clone, Default)]
pub struct MemoryBucket {
    pub objects: Rc<RefCell<BTreeMap<String, (Vec<u8>, ObjectInfo)>>>,
}

#[async_trait(?Send)]
impl ObjectStore for MemoryBucket {
    async fn get(&self, key: &str) -> AppResult<Option<ObjectInfo>> {
        Ok(self
            .objects
            .borrow()
            .get(key)
            .map(|(_, info)| info.clone()))
    }

    async fn put(&self, key: &str, data: Vec<u8>, options: PutOptions) -> AppResult<ObjectInfo> {
        let info = ObjectInfo {
            key: key.to_string(),
            size: data.len() as u64,
            etag: format!("etag-{}", hex::encode(&data[..data.len().min(4)])),
            uploaded: Utc.timestamp_opt(1_700_000_000, 0).single(),
            content_type: Some(options.content_type),
            custom_metadata: options.custom_metadata,
        };
        self.objects
            .borrow_mut()
            .insert(key.to_string(), (data, info.clone()));
        Ok(info)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.borrow_mut().remove(key);
        Ok(())
    }

    async fn list(&self, limit: u32) -> AppResult<ObjectListing> {
        let objects = self.objects.borrow();
        let listed: Vec<ObjectInfo> = objects
            .values()
            .take(limit as usize)
            .map(|(_, info)| info.clone())
            .collect();
        Ok(ObjectListing {
            truncated: objects.len() > listed.len(),
            objects: listed,
        })
    }
}
