use topicsift_core::TopicExtractor;
use topicsift_ingest::DocumentSource;

/// Shared application state accessible from all handlers.
///
/// Holds no per-request data: each extraction builds its own loop state.
pub struct AppState {
    pub extractor: TopicExtractor,
    pub source: DocumentSource,
}

impl AppState {
    pub fn new(extractor: TopicExtractor) -> Self {
        Self {
            extractor,
            source: DocumentSource::new(),
        }
    }
}
