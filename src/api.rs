//! # Request and Response Envelopes
//!
//! Handlers never touch `worker::Request` or `worker::Response` directly.
//! The fetch entry point converts the inbound request into an [`ApiRequest`]
//! and converts the returned [`ApiResponse`] back, so the whole dispatch path
//! runs the same inside the Workers runtime and in native unit tests.

use std::collections::HashMap;

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use worker::{Method, Request, Response, Result, Url};

#[cfg(test)]
use crate::errors::{AppError, AppResult};

/// Edge and connection details Cloudflare attaches to a request (`request.cf`).
///
/// Every field is optional: outside the edge network (local dev, tests) none
/// of them are present.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EdgeMetadata {
    pub colo: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub http_protocol: Option<String>,
    pub tls_version: Option<String>,
    pub asn: Option<u32>,
    pub as_organization: Option<String>,
}

/// An inbound HTTP request, detached from the Workers runtime.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub edge: Option<EdgeMetadata>,
}

impl ApiRequest {
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Converts a Workers request, buffering its body.
    ///
    /// Bodies are only read for methods that carry one.
    pub async fn from_worker(req: &mut Request) -> Result<Self> {
        let method = req.method();
        let url = req.url()?;

        let headers = req
            .headers()
            .entries()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        let body = match method {
            Method::Get | Method::Head | Method::Options => Vec::new(),
            _ => req.bytes().await?,
        };

        let edge = req.cf().map(|cf| EdgeMetadata {
            colo: non_empty(cf.colo()),
            country: cf.country().and_then(non_empty),
            city: cf.city().and_then(non_empty),
            region: cf.region().and_then(non_empty),
            timezone: non_empty(cf.timezone_name()),
            latitude: cf.coordinates().map(|(lat, _)| lat.to_string()),
            longitude: cf.coordinates().map(|(_, lon)| lon.to_string()),
            http_protocol: non_empty(cf.http_protocol()),
            tls_version: non_empty(cf.tls_version()),
            asn: known_asn(cf.asn()),
            as_organization: cf.as_organization().and_then(non_empty),
        });

        Ok(Self {
            method,
            url,
            headers,
            body,
            edge,
        })
    }
}

/// Builders for constructing requests without the Workers runtime.
#[cfg(test)]
impl ApiRequest {
    pub fn new(method: Method, url: &str) -> AppResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| AppError::Internal(format!("Invalid request URL {}: {}", url, e)))?;
        Ok(Self {
            method,
            url,
            headers: HashMap::new(),
            body: Vec::new(),
            edge: None,
        })
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(self, body: &Value) -> Self {
        let bytes = body.to_string().into_bytes();
        self.with_header("content-type", "application/json")
            .with_body(bytes)
    }

    pub fn with_edge(mut self, edge: EdgeMetadata) -> Self {
        self.edge = Some(edge);
        self
    }
}

/// Cloudflare reports ASN 0 when the network is unknown.
fn known_asn(asn: Option<u32>) -> Option<u32> {
    asn.filter(|asn| *asn != 0)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// An outbound response: status, optional JSON body and headers.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn created(body: Value) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    /// A bodiless 200, used for CORS preflight.
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Sets a header, replacing any existing value of the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn into_worker(self) -> Result<Response> {
        let response = match &self.body {
            Some(body) => Response::from_json(body)?,
            None => Response::empty()?,
        };
        let mut response = response.with_status(self.status.as_u16());
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            headers.set(name, value)?;
        }
        Ok(response)
    }
}
