use axum::extract::Multipart;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::ApiError;
use crate::upload::parse_multipart;

pub const AMSL_CONTENT_TYPE: &str = "application/x-yaml";

pub async fn json_to_amsl(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let form = parse_multipart(multipart).await?;
    let json = String::from_utf8(form.file.data)
        .map_err(|_| ApiError::BadRequest("Uploaded file is not UTF-8 text".into()))?;

    let amsl = topicsift_amsl::json_to_amsl(&json)?;
    tracing::info!(filename = %form.file.filename, bytes = amsl.len(), "converted to AMSL");

    Ok(([(header::CONTENT_TYPE, AMSL_CONTENT_TYPE)], amsl))
}
