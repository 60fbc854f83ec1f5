use chrono::Utc;
use serde_json::json;

use crate::api::ApiRequest;
use crate::constants::HEADER_CF_RAY;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Logger struct for handling structured logging
pub struct Logger {
    request_id: String,
}

impl Logger {
    /// Create a new Logger instance
    ///
    /// # Arguments
    ///
    /// * `request_id` - A unique identifier for the current request
    pub fn new(request_id: String) -> Self {
        Self { request_id }
    }

    /// Create a Logger keyed by the request's `cf-ray` id, or a fresh UUID
    /// when the request did not pass through the edge.
    pub fn for_request(req: &ApiRequest) -> Self {
        let request_id = req
            .header(HEADER_CF_RAY)
            .map(str::to_string)
            .unwrap_or_else(crate::utils::generate_request_id);
        Self::new(request_id)
    }

    /// Log an info message
    pub fn info(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(Level::Info, message, data);
    }

    /// Log a warning message
    pub fn warn(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(Level::Warn, message, data);
    }

    /// Log an error message
    pub fn error(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(Level::Error, message, data);
    }

    fn log(&self, level: Level, message: &str, data: Option<serde_json::Value>) {
        let log_data = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level.as_str(),
            "request_id": self.request_id,
            "message": message,
            "data": data
        });

        emit(level, &log_data.to_string());
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        fn emit(level: Level, line: &str) {
            match level {
                Level::Info => worker::console_log!("{}", line),
                Level::Warn => worker::console_warn!("{}", line),
                Level::Error => worker::console_error!("{}", line),
            }
        }
    } else {
        // The console bindings only exist inside the Workers runtime.
        fn emit(_level: Level, _line: &str) {}
    }
}

/// Macro to create a JSON object for additional log data
///
/// Usage: log_data!("key1" => "value1", "key2" => 42)
#[macro_export]
macro_rules! log_data {
    ($($key:expr => $value:expr),*) => {
        Some(serde_json::json!({ $($key: $value),* }))
    };
}
