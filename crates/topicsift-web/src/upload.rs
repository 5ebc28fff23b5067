use axum::extract::Multipart;

use crate::error::ApiError;

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Suffix for the temp copy, so the page source can dispatch on it.
    /// Defaults to `.pdf`.
    pub fn suffix(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_else(|| ".pdf".to_string())
    }
}

/// Parsed form fields from the multipart upload.
pub struct FormFields {
    pub file: UploadedFile,
    pub description: Option<String>,
}

/// Parse a multipart form upload into structured form fields.
///
/// `file` is required; `description` is optional and blank values count as
/// absent. Unknown fields are ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<FormFields, ApiError> {
    let mut file: Option<UploadedFile> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?
                    .to_vec();
                file = Some(UploadedFile { filename, data });
            }
            "description" => {
                let val = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read description: {}", e))
                })?;
                if !val.trim().is_empty() {
                    description = Some(val);
                }
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;
    if file.data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".into()));
    }

    Ok(FormFields { file, description })
}
