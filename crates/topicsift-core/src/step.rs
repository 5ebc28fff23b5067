//! One extraction step: prompt the model with a chunk, validate its answer.

use serde::Deserialize;
use serde_json::Value;

use crate::llm::{CompletionRequest, LlmBackend, LlmError};
use crate::prompt::{SCHEMA_NAME, response_schema, system_prompt};
use crate::topic::{Importance, Topic};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TopicsPayload {
    topics: Vec<CandidateTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CandidateTopic {
    id: String,
    #[serde(alias = "title")]
    topic: String,
    contents: Vec<String>,
    goal: String,
    importance: Importance,
}

/// Validate a structured model answer and convert it into topics.
///
/// Any deviation from the schema (missing or unknown fields, wrong types,
/// importance outside high/medium/low, blank title) rejects the whole answer.
pub fn parse_topics(value: Value) -> Result<Vec<Topic>, LlmError> {
    let payload: TopicsPayload =
        serde_json::from_value(value).map_err(|e| LlmError::Schema(e.to_string()))?;

    payload
        .topics
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            if c.topic.trim().is_empty() {
                return Err(LlmError::Schema(format!("topics[{i}] has an empty title")));
            }
            Ok(Topic {
                id: c.id,
                title: c.topic,
                importance: c.importance,
                contents: c.contents,
                goal: c.goal,
            })
        })
        .collect()
}

/// Run the model over one chunk.
///
/// `titles` and `content_count` describe the topics accumulated so far and
/// go into the prompt; the chunk text is sent unmodified as the user turn.
/// Exactly one backend call is made.
pub async fn extract_step(
    backend: &dyn LlmBackend,
    description: &str,
    titles: &[&str],
    content_count: usize,
    chunk: &str,
) -> Result<Vec<Topic>, LlmError> {
    let request = CompletionRequest {
        system: system_prompt(description, titles, content_count),
        user: chunk.to_string(),
        schema_name: SCHEMA_NAME,
        schema: response_schema(),
    };
    tracing::debug!(
        backend = backend.name(),
        chunk_chars = chunk.chars().count(),
        known_topics = titles.len(),
        "requesting topics"
    );

    let value = backend.complete(&request).await?;
    let topics = parse_topics(value)?;

    tracing::info!(backend = backend.name(), topics = topics.len(), "received topics");
    Ok(topics)
}
