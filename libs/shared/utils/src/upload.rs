use axum::body::Bytes;
use axum::extract::Multipart;
use tracing::debug;

use shared_models::error::AppError;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Reads the first file part named `field_name`. Parts without a file name
/// are plain form fields and are skipped.
pub async fn read_file_field(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string).filter(|name| !name.is_empty()) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        debug!("Received upload '{}' ({} bytes)", file_name, bytes.len());
        return Ok(Some(UploadedFile { file_name, bytes }));
    }

    Ok(None)
}
