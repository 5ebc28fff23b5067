use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::{Value, json};

use super::{CompletionRequest, LlmBackend, LlmError};
use crate::config::LlmConfig;

/// Error bodies longer than this are cut before being put into an error.
const MAX_ERROR_BODY: usize = 500;

/// OpenAI-compatible `/chat/completions` backend using strict JSON-schema output.
///
/// Works against any server that implements the same endpoint (Azure OpenAI
/// proxies, vLLM, llama.cpp server, ...) via `base_url`.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAiChat {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("topicsift/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Build the JSON body for a chat completion with structured output.
pub(crate) fn request_body(model: &str, request: &CompletionRequest) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": request.schema_name,
                "schema": request.schema,
                "strict": true,
            },
        },
    })
}

/// Pull the structured JSON answer out of a chat completion response.
pub(crate) fn parse_chat_response(data: &Value) -> Result<Value, LlmError> {
    let message = data["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .map(|choice| &choice["message"])
        .ok_or_else(|| LlmError::MalformedResponse("no choices in response".into()))?;

    if let Some(refusal) = message["refusal"].as_str() {
        return Err(LlmError::Refusal(refusal.to_string()));
    }

    let content = message["content"]
        .as_str()
        .ok_or_else(|| LlmError::MalformedResponse("message has no text content".into()))?;

    serde_json::from_str(content)
        .map_err(|e| LlmError::MalformedResponse(format!("content is not JSON: {e}")))
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

fn map_send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e)
    }
}

impl LlmBackend for OpenAiChat {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            let body = request_body(&self.model, request);

            let mut req = self
                .client
                .post(self.endpoint())
                .timeout(self.timeout)
                .json(&body);
            if let Some(ref key) = self.api_key {
                req = req.bearer_auth(key);
            }

            let resp = req.send().await.map_err(map_send_error)?;

            let status = resp.status();
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited {
                    retry_after: parse_retry_after(resp.headers()),
                });
            }
            if !status.is_success() {
                let mut body = resp.text().await.unwrap_or_default();
                if body.len() > MAX_ERROR_BODY {
                    let cut = body
                        .char_indices()
                        .map(|(i, _)| i)
                        .take_while(|&i| i <= MAX_ERROR_BODY)
                        .last()
                        .unwrap_or(0);
                    body.truncate(cut);
                    body.push_str("...");
                }
                return Err(LlmError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let data: Value = resp.json().await.map_err(map_send_error)?;
            tracing::debug!(
                model = %self.model,
                usage = %data["usage"],
                "chat completion finished"
            );
            parse_chat_response(&data)
        })
    }
}
