//! # Workers AI Demo
//!
//! `POST /api/demo/ai` runs one of a fixed set of tasks against Workers AI.
//! Each [`AiTask`] knows its model, how much input it accepts, and how to
//! shape the model's input document.

use serde_json::{json, Map, Value};

use crate::api::{ApiRequest, ApiResponse};
use crate::bindings::Bindings;
use crate::errors::{AppError, AppResult};
use crate::middleware::ValidationMiddleware;
use crate::models::AiRequest;
use crate::utils::truncate_chars;

const SERVICE: &str = "Workers AI";
const ERROR_LABEL: &str = "AI processing error";
const ERROR_HINT: &str =
    "Workers AI requires an internet connection and may have rate limits on free tier";

const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Keep responses brief and friendly.";
const CHAT_DEFAULT_PROMPT: &str = "Hello!";
const CHAT_MAX_TOKENS: u32 = 256;
const SUMMARY_MAX_LENGTH: u32 = 150;
const TRANSLATE_SOURCE_LANG: &str = "en";
const TRANSLATE_DEFAULT_TARGET: &str = "es";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiTask {
    Chat,
    Summarize,
    Sentiment,
    Translate,
}

impl AiTask {
    pub const ALL: [AiTask; 4] = [
        AiTask::Chat,
        AiTask::Summarize,
        AiTask::Sentiment,
        AiTask::Translate,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|task| task.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            AiTask::Chat => "chat",
            AiTask::Summarize => "summarize",
            AiTask::Sentiment => "sentiment",
            AiTask::Translate => "translate",
        }
    }

    pub fn model(self) -> &'static str {
        match self {
            AiTask::Chat => "@cf/meta/llama-3.1-8b-instruct",
            AiTask::Summarize => "@cf/facebook/bart-large-cnn",
            AiTask::Sentiment => "@cf/huggingface/distilbert-sst-2-int8",
            AiTask::Translate => "@cf/meta/m2m100-1.2b",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AiTask::Chat => "Chat/conversation completion",
            AiTask::Summarize => "Summarize long text",
            AiTask::Sentiment => "Analyze text sentiment",
            AiTask::Translate => "Translate between languages",
        }
    }

    /// Maximum number of input characters sent to the model.
    pub fn input_cap(self) -> usize {
        match self {
            AiTask::Summarize => 1000,
            AiTask::Chat | AiTask::Sentiment | AiTask::Translate => 500,
        }
    }

    /// Validates the request for this task and builds the model input.
    ///
    /// Returns the (truncated) text actually sent along with the input
    /// document.
    pub fn prepare(self, request: &AiRequest) -> AppResult<(String, Value)> {
        let text = non_empty(&request.text);

        match self {
            AiTask::Chat => {
                let prompt = non_empty(&request.prompt)
                    .or(text)
                    .unwrap_or(CHAT_DEFAULT_PROMPT);
                let input = truncate_chars(prompt, self.input_cap());
                let params = json!({
                    "messages": [
                        { "role": "system", "content": CHAT_SYSTEM_PROMPT },
                        { "role": "user", "content": input },
                    ],
                    "max_tokens": CHAT_MAX_TOKENS,
                });
                Ok((input, params))
            }
            AiTask::Summarize => {
                let text = text.ok_or_else(|| {
                    AppError::bad_request("Text is required for summarization")
                })?;
                let input = truncate_chars(text, self.input_cap());
                let params = json!({ "input_text": input, "max_length": SUMMARY_MAX_LENGTH });
                Ok((input, params))
            }
            AiTask::Sentiment => {
                let text = text.ok_or_else(|| {
                    AppError::bad_request("Text is required for sentiment analysis")
                })?;
                let input = truncate_chars(text, self.input_cap());
                let params = json!({ "text": input });
                Ok((input, params))
            }
            AiTask::Translate => {
                let text = text
                    .ok_or_else(|| AppError::bad_request("Text is required for translation"))?;
                let input = truncate_chars(text, self.input_cap());
                let target = non_empty(&request.target_lang).unwrap_or(TRANSLATE_DEFAULT_TARGET);
                let params = json!({
                    "text": input,
                    "source_lang": TRANSLATE_SOURCE_LANG,
                    "target_lang": target,
                });
                Ok((input, params))
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn task_keys() -> Map<String, Value> {
    let keys: Vec<&str> = AiTask::ALL.iter().map(|task| task.key()).collect();
    let mut extra = Map::new();
    extra.insert("availableTasks".into(), json!(keys));
    extra
}

/// The 405 body lists every task with its description.
pub fn method_hint() -> AppError {
    let tasks: Vec<Value> = AiTask::ALL
        .iter()
        .map(|task| json!({ "task": task.key(), "description": task.description() }))
        .collect();
    let mut extra = Map::new();
    extra.insert("availableTasks".into(), Value::Array(tasks));
    AppError::MethodNotAllowed {
        message: "POST required".into(),
        extra: Some(extra),
    }
}

pub async fn run_task(req: &ApiRequest, bindings: &Bindings) -> AppResult<ApiResponse> {
    let ai = bindings.ai()?;

    let request: AiRequest = ValidationMiddleware::parse_json(&req.body)?;

    let key = match non_empty(&request.task) {
        Some(key) => key,
        None => return Err(AppError::bad_request_with("Task is required", task_keys())),
    };
    let task = AiTask::from_key(key).ok_or_else(|| {
        AppError::bad_request_with(format!("Unknown task: {}", key), task_keys())
    })?;

    let (input, params) = task.prepare(&request)?;

    let result = ai
        .run(task.model(), params)
        .await
        .map_err(|e| e.upstream(ERROR_LABEL).with_hint(ERROR_HINT))?;

    Ok(ApiResponse::ok(json!({
        "task": task.key(),
        "model": task.model(),
        "input": input,
        "result": result,
        "service": SERVICE,
    })))
}
