//! # R2 Object Storage Demo
//!
//! `GET|POST|DELETE /api/demo/storage` uploads small files to R2, lists the
//! bucket, describes a single object, and deletes objects. The `file` query
//! parameter selects the object for GET and DELETE.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::json;

use crate::api::{ApiRequest, ApiResponse};
use crate::bindings::{Bindings, ObjectStore, PutOptions};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::middleware::ValidationMiddleware;
use crate::models::UploadRequest;
use crate::utils::{decode_content, iso_timestamp, sanitize_object_name};
use worker::Method;

const ERROR_LABEL: &str = "R2 error";
const STORAGE: &str = "R2 (Object Storage)";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn handle(req: &ApiRequest, bindings: &Bindings, config: &Config) -> AppResult<ApiResponse> {
    let bucket = bindings.bucket()?;
    let file = req.query("file").filter(|f| !f.is_empty());

    let result = match (req.method.clone(), file) {
        (Method::Get, Some(file)) => describe(bucket, &file).await,
        (Method::Get, None) => list(bucket, config).await,
        (Method::Post, _) => upload(req, bucket, config).await,
        (Method::Delete, Some(file)) => remove(bucket, &file).await,
        (Method::Delete, None) => Err(AppError::bad_request(
            "Specify file to delete with ?file=filename",
        )),
        _ => Err(AppError::method_not_allowed("Method not allowed")),
    };
    result.map_err(|e| e.upstream(ERROR_LABEL))
}

async fn describe(bucket: &dyn ObjectStore, file: &str) -> AppResult<ApiResponse> {
    let object = bucket
        .get(file)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    Ok(ApiResponse::ok(json!({
        "filename": file,
        "size": object.size,
        "uploaded": object.uploaded.map(iso_timestamp),
        "etag": object.etag,
        "httpMetadata": { "contentType": object.content_type },
        "customMetadata": object.custom_metadata,
    })))
}

async fn list(bucket: &dyn ObjectStore, config: &Config) -> AppResult<ApiResponse> {
    let listed = bucket.list(config.object_list_limit).await?;

    let files: Vec<_> = listed
        .objects
        .iter()
        .map(|object| {
            json!({
                "name": object.key,
                "size": object.size,
                "uploaded": object.uploaded.map(iso_timestamp),
            })
        })
        .collect();

    Ok(ApiResponse::ok(json!({
        "count": files.len(),
        "files": files,
        "truncated": listed.truncated,
        "storage": STORAGE,
    })))
}

async fn upload(req: &ApiRequest, bucket: &dyn ObjectStore, config: &Config) -> AppResult<ApiResponse> {
    let upload: UploadRequest = ValidationMiddleware::parse_json(&req.body)?;

    let (Some(name), Some(content)) = (
        upload.name.filter(|s| !s.is_empty()),
        upload.content.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::bad_request("Name and content are required"));
    };

    let key = sanitize_object_name(&name);
    let data = decode_content(&content, upload.is_base64)?;
    ValidationMiddleware::validate_upload_size(data.len(), config.max_upload_bytes)?;

    let size = data.len();
    let options = PutOptions {
        content_type: upload
            .content_type
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        custom_metadata: BTreeMap::from([
            ("uploadedBy".to_string(), "demo".to_string()),
            ("uploadedAt".to_string(), iso_timestamp(Utc::now())),
        ]),
    };
    let object = bucket.put(&key, data, options).await?;

    Ok(ApiResponse::created(json!({
        "success": true,
        "file": {
            "name": key,
            "size": size,
            "etag": object.etag,
        },
    })))
}

async fn remove(bucket: &dyn ObjectStore, file: &str) -> AppResult<ApiResponse> {
    bucket.delete(file).await?;

    Ok(ApiResponse::ok(json!({
        "success": true,
        "deleted": file,
    })))
}
