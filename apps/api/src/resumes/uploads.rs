//! Upload persistence: raw bytes written under the upload directory with a collision-free name.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("Failed to save file {path}: {source}")]
pub struct UploadError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

/// One multipart file part, owned by the coordinator for the duration of a request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Writes the upload as `<uuid>_<sanitized name>` and returns the stored path.
pub async fn save_upload(upload_dir: &Path, file: &UploadedFile) -> Result<PathBuf, UploadError> {
    let path = upload_dir.join(format!(
        "{}_{}",
        Uuid::new_v4(),
        sanitize_filename(&file.filename)
    ));

    match tokio::fs::write(&path, &file.bytes).await {
        Ok(()) => {
            info!(path = %path.display(), "Uploaded file saved");
            Ok(path)
        }
        Err(source) => {
            error!(filename = %file.filename, "Failed to save uploaded file: {source}");
            Err(UploadError { path, source })
        }
    }
}

/// Reduces a client-supplied name to ASCII `[A-Za-z0-9._-]` with no path components.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
