//! Chat-completion backends that return structured (JSON) output.

pub mod mock;
pub mod openai;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

pub use openai::OpenAiChat;

/// A single structured completion request: one system turn, one user turn,
/// and the JSON schema the answer must follow.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub schema_name: &'static str,
    pub schema: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited (429){}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model refused: {0}")]
    Refusal(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("response does not match schema: {0}")]
    Schema(String),
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(", retry after {:.1}s", d.as_secs_f64()),
        None => String::new(),
    }
}

/// A model backend that answers a [`CompletionRequest`] with a JSON value.
///
/// The returned value is untrusted; callers validate it against their own types.
pub trait LlmBackend: Send + Sync {
    /// Human-readable name of the backend/model (e.g. "gpt-5-mini").
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, LlmError>> + Send + 'a>>;
}
