//! The extraction loop: drives [`extract_step`] over every chunk in order.
//!
//! The loop is an explicit state machine (`Running` until the cursor reaches
//! the chunk count, then `Done`) with a hard cap on transitions. Chunks are
//! processed strictly one after another because each prompt carries the
//! titles accumulated from all earlier chunks.

use std::path::Path;
use std::sync::Arc;

use crate::config::ExtractionSettings;
use crate::llm::LlmBackend;
use crate::merge::merge_pages;
use crate::prompt::NO_DESCRIPTION;
use crate::source::PageSource;
use crate::step::extract_step;
use crate::store::{TopicStore, Upsert};
use crate::topic::Topic;
use crate::{ExtractError, ProgressEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Done,
}

/// Mutable state of one extraction request. Owned by a single request and
/// dropped when the loop ends.
#[derive(Debug)]
pub struct ExtractionState {
    description: String,
    chunks: Vec<String>,
    cursor: usize,
    store: TopicStore,
    transition_limit: usize,
}

impl ExtractionState {
    pub fn new(description: Option<&str>, chunks: Vec<String>, transition_margin: usize) -> Self {
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
            .to_string();
        let transition_limit = chunks.len() + transition_margin;
        Self {
            description,
            chunks,
            cursor: 0,
            store: TopicStore::new(),
            transition_limit,
        }
    }

    pub fn status(&self) -> LoopState {
        if self.cursor < self.chunks.len() {
            LoopState::Running
        } else {
            LoopState::Done
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn topics(&self) -> &TopicStore {
        &self.store
    }
}

/// Topic extractor bound to one LLM backend.
///
/// Build once per process and share; every call owns its own
/// [`ExtractionState`], so concurrent requests never see each other's topics.
#[derive(Clone)]
pub struct TopicExtractor {
    backend: Arc<dyn LlmBackend>,
    settings: ExtractionSettings,
}

impl TopicExtractor {
    pub fn new(backend: Arc<dyn LlmBackend>, settings: ExtractionSettings) -> Self {
        tracing::info!(backend = backend.name(), "initialized topic extractor");
        Self { backend, settings }
    }

    /// Read the document through `source` and extract its topics.
    pub async fn extract_topics(
        &self,
        path: &Path,
        description: Option<&str>,
        source: &dyn PageSource,
    ) -> Result<Vec<Topic>, ExtractError> {
        self.extract_topics_with_progress(path, description, source, &|_| {})
            .await
    }

    pub async fn extract_topics_with_progress(
        &self,
        path: &Path,
        description: Option<&str>,
        source: &dyn PageSource,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
    ) -> Result<Vec<Topic>, ExtractError> {
        let pages = source.page_texts(path)?;
        self.run_pages(description, pages, progress).await
    }

    /// Merge raw page texts into chunks and run the loop over them.
    pub async fn run_pages(
        &self,
        description: Option<&str>,
        pages: Vec<String>,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
    ) -> Result<Vec<Topic>, ExtractError> {
        let chunks = merge_pages(&pages, self.settings.merge_threshold);
        tracing::info!(
            pages = pages.len(),
            chunks = chunks.len(),
            "merged short pages"
        );
        self.run_with_progress(description, chunks, progress).await
    }

    /// Run the loop over already-merged chunks.
    pub async fn run(
        &self,
        description: Option<&str>,
        chunks: Vec<String>,
    ) -> Result<Vec<Topic>, ExtractError> {
        self.run_with_progress(description, chunks, &|_| {}).await
    }

    pub async fn run_with_progress(
        &self,
        description: Option<&str>,
        chunks: Vec<String>,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
    ) -> Result<Vec<Topic>, ExtractError> {
        let mut state = ExtractionState::new(description, chunks, self.settings.transition_margin);
        self.drive(&mut state, progress).await?;

        let content_items = state.store.content_count();
        let topics = state.store.into_topics();
        progress(ProgressEvent::Finished {
            topics: topics.len(),
            content_items,
        });
        tracing::info!(topics = topics.len(), content_items, "extraction finished");
        Ok(topics)
    }

    async fn drive(
        &self,
        state: &mut ExtractionState,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
    ) -> Result<(), ExtractError> {
        let mut transitions = 0;
        while state.status() == LoopState::Running {
            if transitions >= state.transition_limit {
                tracing::error!(
                    transitions,
                    limit = state.transition_limit,
                    cursor = state.cursor,
                    "extraction loop exceeded its transition limit"
                );
                return Err(ExtractError::LoopInvariant {
                    steps: transitions,
                    limit: state.transition_limit,
                });
            }
            self.step(state, progress).await?;
            transitions += 1;
        }
        Ok(())
    }

    /// Process the chunk under the cursor and advance the cursor by one.
    async fn step(
        &self,
        state: &mut ExtractionState,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
    ) -> Result<LoopState, ExtractError> {
        let index = state.cursor;
        let total = state.chunks.len();
        progress(ProgressEvent::ChunkStarted { index, total });

        let candidates = {
            let titles = state.store.titles();
            tracing::debug!(chunk = index, current_topics = %titles.join(", "), "extracting chunk");
            extract_step(
                self.backend.as_ref(),
                &state.description,
                &titles,
                state.store.content_count(),
                &state.chunks[index],
            )
            .await
            .map_err(|source| {
                tracing::warn!(chunk = index, error = %source, "extraction step failed");
                ExtractError::ModelInvocation {
                    chunk_index: index,
                    source,
                }
            })?
        };

        let (mut inserted, mut merged) = (0, 0);
        for candidate in candidates {
            match state.store.upsert(candidate) {
                Upsert::Inserted(_) => inserted += 1,
                Upsert::Merged(_) => merged += 1,
            }
        }

        state.cursor += 1;
        progress(ProgressEvent::ChunkFinished {
            index,
            total,
            inserted,
            merged,
        });
        Ok(state.status())
    }
}
