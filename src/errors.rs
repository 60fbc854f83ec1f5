//! # Error Types
//!
//! Every failure a handler can report maps onto one `AppError` variant, and
//! every variant renders as a JSON body with at least an `error` key.
//!
//! | Variant              | Status |
//! |----------------------|--------|
//! | `BadRequest`         | 400    |
//! | `NotFound`           | 404    |
//! | `MethodNotAllowed`   | 405    |
//! | `Upstream`           | 500    |
//! | `BindingUnavailable` | 503    |
//!
//! `Worker`, `Serialization` and `Internal` are raw failures from bindings or
//! internal processing. Handlers relabel them with [`AppError::upstream`] so
//! the caller sees which service failed.

use http::StatusCode;
use serde_json::{json, Map, Value};
use thiserror::Error;
use worker::Error as WorkerError;

use crate::api::ApiResponse;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        extra: Option<Map<String, Value>>,
    },
    #[error("Method not allowed: {message}")]
    MethodNotAllowed {
        message: String,
        extra: Option<Map<String, Value>>,
    },
    #[error("{service} not configured")]
    BindingUnavailable {
        service: &'static str,
        hint: &'static str,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{label}: {message}")]
    Upstream {
        label: &'static str,
        message: String,
        stack: Option<String>,
        hint: Option<&'static str>,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            extra: None,
        }
    }

    /// A 400 whose body carries additional machine-readable fields.
    pub fn bad_request_with(message: impl Into<String>, extra: Map<String, Value>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            extra: Some(extra),
        }
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        AppError::MethodNotAllowed {
            message: message.into(),
            extra: None,
        }
    }

    /// Relabels a raw failure as the calling handler's 500.
    ///
    /// Client-facing variants pass through untouched.
    pub fn upstream(self, label: &'static str) -> Self {
        match self {
            AppError::Worker(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                let message = self.raw_message();
                AppError::Upstream {
                    label,
                    message,
                    stack: None,
                    hint: None,
                }
            }
            other => other,
        }
    }

    /// Like [`AppError::upstream`] but keeps the first three entries of the
    /// error's source chain in a `stack` field.
    pub fn upstream_with_stack(self, label: &'static str) -> Self {
        let stack = source_chain(&self);
        match self.upstream(label) {
            AppError::Upstream {
                label,
                message,
                hint,
                ..
            } => AppError::Upstream {
                label,
                message,
                stack: Some(stack),
                hint,
            },
            other => other,
        }
    }

    /// Attaches a remediation hint to an `Upstream` error.
    pub fn with_hint(self, hint: &'static str) -> Self {
        match self {
            AppError::Upstream {
                label,
                message,
                stack,
                ..
            } => AppError::Upstream {
                label,
                message,
                stack,
                hint: Some(hint),
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BindingUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Worker(_)
            | AppError::Serialization(_)
            | AppError::Internal(_)
            | AppError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error as a JSON response.
    ///
    /// Only the 500 paths expose the underlying error text.
    pub fn to_response(&self) -> ApiResponse {
        let mut body = Map::new();
        match self {
            AppError::BadRequest { message, extra } | AppError::MethodNotAllowed { message, extra } => {
                body.insert("error".into(), json!(message));
                if let Some(extra) = extra {
                    body.extend(extra.clone());
                }
            }
            AppError::NotFound(message) => {
                body.insert("error".into(), json!(message));
            }
            AppError::BindingUnavailable { service, hint } => {
                body.insert("error".into(), json!(format!("{} not configured", service)));
                body.insert("hint".into(), json!(hint));
            }
            AppError::Upstream {
                label,
                message,
                stack,
                hint,
            } => {
                body.insert("error".into(), json!(label));
                body.insert("message".into(), json!(message));
                if let Some(stack) = stack {
                    body.insert("stack".into(), json!(stack));
                }
                if let Some(hint) = hint {
                    body.insert("hint".into(), json!(hint));
                }
            }
            AppError::Worker(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                body.insert("error".into(), json!("Internal server error"));
                body.insert("message".into(), json!(self.raw_message()));
            }
        }
        ApiResponse::json(self.status(), Value::Object(body))
    }

    fn raw_message(&self) -> String {
        match self {
            AppError::Worker(e) => e.to_string(),
            AppError::Serialization(e) => e.to_string(),
            AppError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

fn source_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut lines = Vec::with_capacity(3);
    let mut current = Some(error);
    while let Some(err) = current {
        if lines.len() == 3 {
            break;
        }
        lines.push(err.to_string());
        current = err.source();
    }
    lines.join("\n")
}

impl From<AppError> for WorkerError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Worker(e) => e,
            other => WorkerError::RustError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_merges_extra_fields() {
        let mut extra = Map::new();
        extra.insert("availableTasks".into(), json!(["chat"]));
        let response = AppError::bad_request_with("Unknown task: x", extra).to_response();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body = response.body.unwrap();
        assert_eq!(body["error"], "Unknown task: x");
        assert_eq!(body["availableTasks"], json!(["chat"]));
    }

    #[test]
    fn upstream_relabels_internal_failures_only() {
        let relabelled = AppError::Internal("connection reset".into()).upstream("KV error");
        let body = relabelled.to_response().body.unwrap();
        assert_eq!(body["error"], "KV error");
        assert_eq!(body["message"], "connection reset");

        let untouched = AppError::bad_request("Name and message are required").upstream("KV error");
        assert_eq!(untouched.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stack_is_included_for_labelled_failures() {
        let response = AppError::Internal("no such table".into())
            .upstream_with_stack("Database error")
            .to_response();
        let body = response.body.unwrap();
        assert_eq!(body["stack"], "Internal error: no such table");
    }

    #[test]
    fn binding_unavailable_is_503_with_hint() {
        let response = AppError::BindingUnavailable {
            service: "KV",
            hint: "bind it",
        }
        .to_response();

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        let body = response.body.unwrap();
        assert_eq!(body["error"], "KV not configured");
        assert_eq!(body["hint"], "bind it");
    }
}
