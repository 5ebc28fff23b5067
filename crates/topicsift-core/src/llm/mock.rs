//! Scripted LLM backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use super::{CompletionRequest, LlmBackend, LlmError};

/// A configurable mock response for [`MockLlm`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this JSON value as the structured answer.
    Json(Value),
    /// Simulate a 429.
    RateLimited { retry_after: Option<Duration> },
    /// Simulate a timeout in the transport.
    Timeout,
    /// Simulate a non-success HTTP status.
    Status(u16),
}

/// A hand-rolled mock implementing [`LlmBackend`] for tests.
///
/// Supports:
/// - A fixed response (used for every call), **or**
/// - A sequence of responses (one per call, repeating the last if exhausted).
/// - Optional per-call latency.
/// - Call counting and a log of every request received.
pub struct MockLlm {
    name: &'static str,
    /// Pending responses, stored reversed so `pop()` yields the next one.
    responses: Mutex<Vec<MockResponse>>,
    /// Used when the sequence is empty (or in single-response mode).
    fallback: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlm {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            name: "mock",
            responses: Mutex::new(Vec::new()),
            fallback: response,
            delay: None,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        let fallback = responses.last().cloned().unwrap();
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            ..Self::new(fallback)
        }
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `complete()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = self.responses.lock().unwrap();
        if let Some(resp) = seq.pop() {
            resp
        } else {
            self.fallback.clone()
        }
    }
}

impl LlmBackend for MockLlm {
    fn name(&self) -> &str {
        self.name
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value, LlmError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let response = self.next_response();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }

            match response {
                MockResponse::Json(value) => Ok(value),
                MockResponse::RateLimited { retry_after } => {
                    Err(LlmError::RateLimited { retry_after })
                }
                MockResponse::Timeout => Err(LlmError::Timeout),
                MockResponse::Status(status) => Err(LlmError::Status {
                    status,
                    body: "mock error".into(),
                }),
            }
        })
    }
}
