//! # D1 Guestbook Demo
//!
//! `GET|POST|DELETE /api/demo/db` lists, signs and clears a guestbook kept in
//! a D1 table. The table is created on demand, so a fresh database works
//! without a migration step.

use serde_json::json;

use crate::api::{ApiRequest, ApiResponse};
use crate::bindings::{Bindings, DocumentStore, SqlValue};
use crate::config::Config;
use crate::constants::{MAX_GUESTBOOK_MESSAGE_CHARS, MAX_GUESTBOOK_NAME_CHARS};
use crate::errors::{AppError, AppResult};
use crate::middleware::ValidationMiddleware;
use crate::models::{GuestbookEntry, GuestbookPost};
use crate::utils::truncate_chars;
use worker::Method;

const ERROR_LABEL: &str = "Database error";
const DATABASE: &str = "D1 (SQLite)";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS guestbook (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";
const SELECT_LATEST: &str = "SELECT * FROM guestbook ORDER BY created_at DESC LIMIT ?";
const SELECT_BY_ID: &str = "SELECT * FROM guestbook WHERE id = ?";
const INSERT_ENTRY: &str = "INSERT INTO guestbook (name, message) VALUES (?, ?)";
const DELETE_ALL: &str = "DELETE FROM guestbook";

pub async fn handle(req: &ApiRequest, bindings: &Bindings, config: &Config) -> AppResult<ApiResponse> {
    let db = bindings.database()?;

    dispatch(req, db, config)
        .await
        .map_err(|e| e.upstream_with_stack(ERROR_LABEL))
}

async fn dispatch(req: &ApiRequest, db: &dyn DocumentStore, config: &Config) -> AppResult<ApiResponse> {
    db.run(CREATE_TABLE, &[]).await?;

    match req.method {
        Method::Get => list_entries(req, db, config).await,
        Method::Post => sign(req, db).await,
        Method::Delete => clear(req, db).await,
        _ => Err(AppError::method_not_allowed("Method not allowed")),
    }
}

async fn list_entries(req: &ApiRequest, db: &dyn DocumentStore, config: &Config) -> AppResult<ApiResponse> {
    let limit = ValidationMiddleware::int_param(req.query("limit").as_deref())
        .filter(|n| *n > 0)
        .unwrap_or(i64::from(config.guestbook_default_limit));

    let rows = db.all(SELECT_LATEST, &[SqlValue::Integer(limit)]).await?;
    let entries = rows
        .into_iter()
        .map(serde_json::from_value::<GuestbookEntry>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResponse::ok(json!({
        "count": entries.len(),
        "entries": entries,
        "database": DATABASE,
    })))
}

async fn sign(req: &ApiRequest, db: &dyn DocumentStore) -> AppResult<ApiResponse> {
    let post: GuestbookPost = ValidationMiddleware::parse_json(&req.body)?;

    let (Some(name), Some(message)) = (
        post.name.filter(|s| !s.is_empty()),
        post.message.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::bad_request("Name and message are required"));
    };

    let outcome = db
        .run(
            INSERT_ENTRY,
            &[
                SqlValue::Text(truncate_chars(&name, MAX_GUESTBOOK_NAME_CHARS)),
                SqlValue::Text(truncate_chars(&message, MAX_GUESTBOOK_MESSAGE_CHARS)),
            ],
        )
        .await?;

    if !outcome.success {
        return Err(AppError::Internal("Insert did not succeed".into()));
    }

    let row_id = outcome
        .meta
        .last_row_id
        .ok_or_else(|| AppError::Internal("Insert returned no row id".into()))?;
    let entry = db
        .all(SELECT_BY_ID, &[SqlValue::Integer(row_id)])
        .await?
        .into_iter()
        .next()
        .map(serde_json::from_value::<GuestbookEntry>)
        .transpose()?;

    Ok(ApiResponse::created(json!({
        "success": true,
        "entry": entry,
        "meta": {
            "rows_written": outcome.meta.affected_rows().unwrap_or(1),
            "duration_ms": outcome.meta.duration_ms,
        },
    })))
}

async fn clear(req: &ApiRequest, db: &dyn DocumentStore) -> AppResult<ApiResponse> {
    if req.query("confirm").as_deref() != Some("true") {
        return Err(AppError::bad_request("Add ?confirm=true to delete all entries"));
    }

    let outcome = db.run(DELETE_ALL, &[]).await?;

    Ok(ApiResponse::ok(json!({
        "success": true,
        "deleted": outcome.meta.affected_rows().unwrap_or(0),
    })))
}
