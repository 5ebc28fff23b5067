use crate::merge::MERGE_THRESHOLD;

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Extra loop transitions allowed beyond one per chunk.
pub const DEFAULT_TRANSITION_MARGIN: usize = 2;

/// Connection settings for the chat-completion backend.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Per-request timeout. A timeout fails the extraction.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Tuning knobs for the page merger and the extraction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSettings {
    /// Pages shorter than this (trimmed, in characters) are merged backwards.
    pub merge_threshold: usize,
    pub transition_margin: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            merge_threshold: MERGE_THRESHOLD,
            transition_margin: DEFAULT_TRANSITION_MARGIN,
        }
    }
}
