//! # Request Routing and Dispatch
//!
//! This module maps request paths to demo endpoints and applies the steps
//! every endpoint shares.
//!
//! ## Request Flow
//!
//! 1. **Route**: Unknown paths get a JSON 404
//! 2. **CORS Preflight**: `OPTIONS` returns an empty 200 with CORS headers
//! 3. **Method Gate**: Verbs an endpoint does not accept get a 405
//! 4. **Handler**: Binding check, input validation, the binding call(s)
//! 5. **Response Shaping**: Errors become JSON bodies; CORS headers are added
//!
//! ## Supported Routes
//!
//! - `POST /api/demo/ai` - Workers AI tasks
//! - `GET|POST|DELETE /api/demo/db` - D1 guestbook
//! - `POST /api/demo/echo` - Echo and transform
//! - `ANY /api/demo/info` - Edge/request metadata
//! - `GET|POST|DELETE /api/demo/kv` - KV counter
//! - `GET /api/demo/random` - Random values
//! - `GET|POST|DELETE /api/demo/storage` - R2 files
//! - `GET /api/demo/time` - Current time
//! - `ANY /api/hello` - Greeting
//! - `GET /health` - Health check

use std::sync::Arc;
use worker::*;

use crate::api::{ApiRequest, ApiResponse};
use crate::bindings::{BindingKind, Bindings};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::handlers::{self, handle_health_check, handle_not_found};
use crate::log_data;
use crate::logging::Logger;
use crate::middleware::{CorsMiddleware, CorsPolicy};

const READ_ONLY: &[Method] = &[Method::Get];
const POST_ONLY: &[Method] = &[Method::Post];
const CRUD: &[Method] = &[Method::Get, Method::Post, Method::Delete];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Ai,
    Guestbook,
    Echo,
    Info,
    Counter,
    Random,
    Storage,
    Time,
    Hello,
    Health,
}

impl Endpoint {
    pub const ALL: [Endpoint; 10] = [
        Endpoint::Ai,
        Endpoint::Guestbook,
        Endpoint::Echo,
        Endpoint::Info,
        Endpoint::Counter,
        Endpoint::Random,
        Endpoint::Storage,
        Endpoint::Time,
        Endpoint::Hello,
        Endpoint::Health,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Ai => "/api/demo/ai",
            Endpoint::Guestbook => "/api/demo/db",
            Endpoint::Echo => "/api/demo/echo",
            Endpoint::Info => "/api/demo/info",
            Endpoint::Counter => "/api/demo/kv",
            Endpoint::Random => "/api/demo/random",
            Endpoint::Storage => "/api/demo/storage",
            Endpoint::Time => "/api/demo/time",
            Endpoint::Hello => "/api/hello",
            Endpoint::Health => "/health",
        }
    }

    /// Matches a request path, ignoring one trailing slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };
        Self::ALL.into_iter().find(|endpoint| endpoint.path() == path)
    }

    /// Verbs the endpoint serves. `None` means any method reaches the handler.
    pub fn allowed_methods(self) -> Option<&'static [Method]> {
        match self {
            Endpoint::Ai | Endpoint::Echo => Some(POST_ONLY),
            Endpoint::Guestbook | Endpoint::Counter | Endpoint::Storage => Some(CRUD),
            Endpoint::Random | Endpoint::Time | Endpoint::Health => Some(READ_ONLY),
            Endpoint::Info | Endpoint::Hello => None,
        }
    }

    fn accepts(self, method: &Method) -> bool {
        self.allowed_methods()
            .map_or(true, |methods| methods.contains(method))
    }

    pub fn cors(self) -> CorsPolicy {
        match self {
            Endpoint::Ai => CorsPolicy::post_only(true),
            Endpoint::Echo => CorsPolicy::post_only(false),
            Endpoint::Guestbook | Endpoint::Counter | Endpoint::Storage => CorsPolicy::crud(),
            Endpoint::Info
            | Endpoint::Random
            | Endpoint::Time
            | Endpoint::Hello
            | Endpoint::Health => CorsPolicy::read_only(),
        }
    }

    fn method_not_allowed(self) -> AppError {
        match self {
            Endpoint::Ai => handlers::ai::method_hint(),
            Endpoint::Echo => AppError::method_not_allowed("POST required. Send JSON body to echo."),
            _ => AppError::method_not_allowed("Method not allowed"),
        }
    }

    async fn call(self, req: &ApiRequest, bindings: &Bindings, config: &Config) -> AppResult<ApiResponse> {
        match self {
            Endpoint::Ai => handlers::ai::run_task(req, bindings).await,
            Endpoint::Guestbook => handlers::guestbook::handle(req, bindings, config).await,
            Endpoint::Echo => handlers::echo::echo(req).await,
            Endpoint::Info => handlers::info::request_info(req).await,
            Endpoint::Counter => handlers::counter::handle(req, bindings).await,
            Endpoint::Random => handlers::random::generate(req, config).await,
            Endpoint::Storage => handlers::storage::handle(req, bindings, config).await,
            Endpoint::Time => handlers::time::current_time().await,
            Endpoint::Hello => handlers::hello::hello(req).await,
            Endpoint::Health => handle_health_check(req).await,
        }
    }
}

/// Routes a request and always produces a response.
///
/// Every error a handler returns is rendered here, so nothing escapes to the
/// Workers runtime as an exception.
pub async fn dispatch(
    req: &ApiRequest,
    bindings: &Bindings,
    config: &Config,
    logger: &Logger,
) -> ApiResponse {
    let Some(endpoint) = Endpoint::from_path(req.path()) else {
        logger.warn("No route", log_data!("path" => req.path()));
        return CorsMiddleware::apply_headers(handle_not_found().to_response(), CorsPolicy::read_only());
    };

    // Handle CORS preflight requests early to avoid unnecessary processing
    if req.method == Method::Options {
        return CorsMiddleware::handle_preflight(endpoint.cors());
    }

    let result = if endpoint.accepts(&req.method) {
        endpoint.call(req, bindings, config).await
    } else {
        Err(endpoint.method_not_allowed())
    };

    let response = match result {
        Ok(response) => response,
        Err(error) => {
            let data = log_data!("path" => endpoint.path(), "error" => error.to_string());
            if error.status().is_server_error() {
                logger.error("Request failed", data);
            } else {
                logger.warn("Request rejected", data);
            }
            error.to_response()
        }
    };

    CorsMiddleware::apply_headers(response, endpoint.cors())
}

/// Handles incoming HTTP requests from the Workers runtime.
///
/// Converts the request, collects the configured bindings, dispatches, and
/// converts the response back.
pub async fn handle_request(mut req: Request, env: Env, config: Arc<Config>) -> Result<Response> {
    let api_req = ApiRequest::from_worker(&mut req).await?;
    let logger = Logger::for_request(&api_req);

    let bindings = Bindings::from_env(&env, &config);

    logger.info(
        "Routing request",
        log_data!(
            "method" => api_req.method.to_string(),
            "path" => api_req.path(),
            "ai" => bindings.has_binding(BindingKind::Ai),
            "db" => bindings.has_binding(BindingKind::Database),
            "kv" => bindings.has_binding(BindingKind::KeyValue),
            "bucket" => bindings.has_binding(BindingKind::Bucket)
        ),
    );

    let response = dispatch(&api_req, &bindings, &config, &logger).await;
    response.into_worker()
}
