//! # Edge Demos - Cloudflare Workers
//!
//! A set of small JSON API endpoints showing what a Worker can do with the
//! platform's bindings: Workers AI, D1, KV and R2, plus a few binding-free
//! utilities that run entirely at the edge.
//!
//! ## Architecture
//!
//! - **Router**: Routes requests, gates methods, answers CORS preflights
//! - **Api**: Platform-neutral request/response types
//! - **Bindings**: Traits over the platform services, with Workers impls
//! - **Handlers**: One module per demo endpoint
//! - **Middleware**: CORS headers and input validation
//!
//! ## Endpoints
//!
//! ```text
//! POST            /api/demo/ai       - Run an AI task (chat, summarize, ...)
//! GET|POST|DELETE /api/demo/db       - Guestbook backed by D1
//! POST            /api/demo/echo     - Echo a JSON body, optionally transformed
//! ANY             /api/demo/info     - Request and edge metadata
//! GET|POST|DELETE /api/demo/kv       - Counter backed by KV
//! GET             /api/demo/random   - Random numbers, UUIDs, dice, coins
//! GET|POST|DELETE /api/demo/storage  - Small files backed by R2
//! GET             /api/demo/time     - Current time
//! ANY             /api/hello         - Greeting
//! GET             /health            - Health check
//! ```

use std::sync::{Arc, OnceLock};
use worker::*;

mod api;
mod bindings;
mod config;
mod constants;
mod errors;
mod handlers;
mod logging;
mod middleware;
mod models;
mod router;
mod utils;

use config::Config;

static CONFIG_CACHE: OnceLock<Arc<Config>> = OnceLock::new();

/// Main entry point for the Cloudflare Worker.
///
/// Sets up panic reporting, loads configuration once per isolate, and hands
/// the request to the router. Handler failures are rendered as JSON by the
/// router; only request conversion failures reach the runtime.
#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let config = load_config(&env).await?;

    router::handle_request(req, env, config).await
}

async fn load_config(env: &Env) -> Result<Arc<Config>> {
    if let Some(config) = CONFIG_CACHE.get() {
        return Ok(config.clone());
    }

    let config = Arc::new(Config::load(env).await?);
    let _ = CONFIG_CACHE.set(config.clone());
    Ok(config)
}
