//! Upload Coordinator: validate → store bytes → extract text → structure → persist.

use std::path::PathBuf;

use anyhow::anyhow;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::resumes::extract::{extract_text, file_extension, DocumentKind, ExtractError};
use crate::resumes::recovery::ParseOutcome;
use crate::resumes::uploads::{save_upload, UploadedFile};
use crate::state::AppState;

/// Runs one upload end to end and returns the new document id.
/// The record itself is only available through a later fetch.
pub async fn process_upload(state: &AppState, file: UploadedFile) -> Result<String, AppError> {
    let filename = file.filename.clone();
    info!(filename = %filename, bytes = file.bytes.len(), "Received file upload");

    let kind = validate_extension(state, &filename)?;

    let path = save_upload(&state.config.upload_dir, &file).await?;
    drop(file);

    let text = extract_blocking(path, kind).await.inspect_err(|e| {
        warn!(filename = %filename, "Processing error: {e}");
    })?;

    info!(filename = %filename, "Calling LLM to parse extracted text");
    let outcome = state.extractor.extract(&text).await?;

    let document_id = Uuid::new_v4().to_string();
    let record = match outcome {
        ParseOutcome::Structured(parsed) | ParseOutcome::Recovered(parsed) => {
            ResumeRecord::new(document_id.clone(), parsed, &text)
        }
        ParseOutcome::Unrecoverable(raw) => ResumeRecord::unstructured(document_id.clone(), raw, &text),
    };
    if record.is_unstructured() {
        warn!(filename = %filename, document_id = %document_id, "Storing unstructured LLM output");
    }

    state.store.upsert(&document_id, &record).await?;
    info!(filename = %filename, document_id = %document_id, "Completed processing resume");

    Ok(document_id)
}

/// Accepts only configured extensions that also have an extractor.
fn validate_extension(state: &AppState, filename: &str) -> Result<DocumentKind, AppError> {
    let ext = file_extension(filename)
        .filter(|ext| state.config.accepts_extension(ext))
        .ok_or_else(|| {
            warn!(filename, "Rejected unsupported file type");
            AppError::Validation("Only PDF or DOCX files are supported.".to_string())
        })?;

    DocumentKind::from_extension(&ext).ok_or_else(|| ExtractError::UnsupportedType.into())
}

/// Parsing libraries are synchronous and may panic on hostile input; both stay off the runtime.
async fn extract_blocking(path: PathBuf, kind: DocumentKind) -> Result<String, AppError> {
    match tokio::task::spawn_blocking(move || extract_text(&path, kind)).await {
        Ok(result) => Ok(result?),
        Err(e) if e.is_panic() => Err(ExtractError::Unreadable.into()),
        Err(e) => Err(AppError::Internal(anyhow!("text extraction task failed: {e}"))),
    }
}
