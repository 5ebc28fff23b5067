use std::io::Write;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use topicsift_core::{PageSource, Topic};

use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::{UploadedFile, parse_multipart};

pub async fn extract_topics(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Vec<Topic>>, ApiError> {
    let form = parse_multipart(multipart).await?;
    tracing::info!(
        filename = %form.file.filename,
        bytes = form.file.data.len(),
        has_description = form.description.is_some(),
        "extract-topics request"
    );

    let pages = read_pages(&state, form.file).await?;
    let topics = state
        .extractor
        .run_pages(form.description.as_deref(), pages, &|_| {})
        .await?;

    Ok(Json(topics))
}

/// Write the upload to a temp file and read its pages on the blocking pool.
///
/// The temp file is dropped (and deleted) inside the blocking task, whatever
/// the outcome.
async fn read_pages(state: &AppState, file: UploadedFile) -> Result<Vec<String>, ApiError> {
    let source = state.source.clone();
    let suffix = file.suffix();

    tokio::task::spawn_blocking(move || -> Result<Vec<String>, ApiError> {
        let mut tmp = tempfile::Builder::new()
            .prefix("topicsift-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| ApiError::Internal(format!("Failed to create temp file: {}", e)))?;
        tmp.write_all(&file.data)
            .and_then(|_| tmp.flush())
            .map_err(|e| ApiError::Internal(format!("Failed to write temp file: {}", e)))?;

        Ok(source.page_texts(tmp.path())?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Page extraction task failed: {}", e)))?
}
