//! Axum route handlers for the Resume API.

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::resumes::ingest::process_upload;
use crate::resumes::uploads::UploadedFile;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub document_id: String,
}

/// POST /api/upload
///
/// Multipart upload of a PDF or DOCX under the `file` field. Returns only the new id.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let file = read_file_part(&mut multipart).await?;
    let document_id = process_upload(&state, file).await?;
    Ok(Json(UploadResponse { document_id }))
}

/// GET /api/resume/:document_id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    info!(document_id = %document_id, "Fetching resume");
    match state.store.get(&document_id).await {
        Some(record) => Ok(Json(record)),
        None => {
            warn!(document_id = %document_id, "Resume not found");
            Err(AppError::NotFound("Resume not found".to_string()))
        }
    }
}

async fn read_file_part(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(FILE_FIELD) {
            return into_upload(field).await;
        }
        // Drain unrelated parts so the stream can advance.
        field.bytes().await.map_err(multipart_error)?;
    }
    Err(AppError::Validation(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

async fn into_upload(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;
    Ok(UploadedFile { filename, bytes })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt; // for oneshot

    use super::*;
    use crate::config::test_config;
    use crate::models::resume::RAW_TEXT_CAP;
    use crate::resumes::extract::tests::{docx_fixture, pdf_fixture};
    use crate::resumes::structured::{CannedExtractor, FailingExtractor, StructuredExtractor};
    use crate::routes::build_router;
    use crate::store::JsonFileStore;

    const BOUNDARY: &str = "resume-parser-test-boundary";

    const MODEL_JSON: &str = r#"{
        "contact": {"name": "Jane Doe", "email": "jane@example.com"},
        "summary": "Backend engineer",
        "experience": [{"company": "Acme", "role": "Engineer", "responsibilities": ["Shipped APIs"]}],
        "education": [{"degree": "BSc", "institution": "TU Berlin", "year": 2019}],
        "skills": ["Rust", "SQL"],
        "certifications": ["CKA"]
    }"#;

    async fn test_app(dir: &std::path::Path, extractor: Arc<dyn StructuredExtractor>) -> Router {
        let config = test_config(dir);
        std::fs::create_dir_all(&config.upload_dir).unwrap();
        let store = JsonFileStore::open(&config.metadata_file).await.unwrap();
        build_router(AppState {
            config,
            store: Arc::new(store),
            extractor,
        })
    }

    fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(document_id: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/resume/{document_id}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn upload_docx(app: &Router, filename: &str, paragraphs: &[&str]) -> String {
        let response = app
            .clone()
            .oneshot(upload_request(filename, &docx_fixture(paragraphs, &["Rust"])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: UploadResponse = serde_json::from_value(json_body(response).await).unwrap();
        body.document_id
    }

    #[tokio::test]
    async fn test_upload_then_fetch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let document_id = upload_docx(&app, "jane.docx", &["Jane Doe", "Backend engineer"]).await;
        assert!(!document_id.is_empty());

        let response = app.clone().oneshot(get_request(&document_id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let record = json_body(response).await;
        assert_eq!(record["document_id"], document_id.as_str());
        assert_eq!(record["contact"]["name"], "Jane Doe");
        assert_eq!(record["education"][0]["year"], "2019");
        assert_eq!(record["skills"], serde_json::json!(["Rust", "SQL"]));
        assert_eq!(record["raw_text"], "Jane Doe\nBackend engineer\nRust");
        assert!(record.get("_raw").is_none());
    }

    #[tokio::test]
    async fn test_pdf_upload_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let response = app
            .clone()
            .oneshot(upload_request("cv.pdf", &pdf_fixture("Jane Doe")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let document_id = json_body(response).await["document_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app.oneshot(get_request(&document_id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record = json_body(response).await;
        assert_eq!(record["document_id"], document_id.as_str());
        assert!(record["raw_text"].as_str().unwrap().contains("Jane Doe"));
        assert_eq!(record["skills"], serde_json::json!(["Rust", "SQL"]));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let response = app
            .oneshot(upload_request("resume.txt", b"plain text resume"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            std::fs::read_dir(dir.path().join("uploads")).unwrap().count(),
            0
        );
    }

    #[tokio::test]
    async fn test_blank_document_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let blank = {
            let bytes = docx_fixture(&[" "], &[]);
            upload_request("blank.docx", &bytes)
        };
        let response = app.oneshot(blank).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let response = app
            .oneshot(upload_request("old.doc", b"\xD0\xCF\x11\xE0 legacy word file"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_without_detail() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(FailingExtractor)).await;

        let bytes = docx_fixture(&["Jane Doe"], &[]);
        let response = app
            .oneshot(upload_request("jane.docx", &bytes))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("provider unavailable"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let response = app.oneshot(get_request("never-issued")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty_lists() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            dir.path(),
            Arc::new(CannedExtractor(r#"{"summary": "only a summary"}"#.into())),
        )
        .await;

        let document_id = upload_docx(&app, "jane.docx", &["Jane"]).await;
        let record = json_body(app.oneshot(get_request(&document_id)).await.unwrap()).await;

        for field in ["experience", "education", "skills", "certifications"] {
            assert_eq!(record[field], serde_json::json!([]), "{field}");
        }
        assert!(record["contact"].is_null());
    }

    #[tokio::test]
    async fn test_prose_wrapped_response_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let raw = format!("Here is the JSON you asked for:\n{MODEL_JSON}\nThanks!");
        let app = test_app(dir.path(), Arc::new(CannedExtractor(raw))).await;

        let document_id = upload_docx(&app, "jane.docx", &["Jane"]).await;
        let record = json_body(app.oneshot(get_request(&document_id)).await.unwrap()).await;

        assert_eq!(record["certifications"], serde_json::json!(["CKA"]));
        assert!(record.get("_raw").is_none());
    }

    #[tokio::test]
    async fn test_unrecoverable_response_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            dir.path(),
            Arc::new(CannedExtractor("no structured data available".into())),
        )
        .await;

        let document_id = upload_docx(&app, "jane.docx", &["Jane"]).await;
        let record = json_body(app.oneshot(get_request(&document_id)).await.unwrap()).await;

        assert_eq!(record["_raw"], "no structured data available");
        assert_eq!(record["skills"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_empty_model_reply_is_stored_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(String::new()))).await;

        let document_id = upload_docx(&app, "jane.docx", &["Jane"]).await;
        let record = json_body(app.oneshot(get_request(&document_id)).await.unwrap()).await;

        assert_eq!(record["_raw"], "");
        assert_eq!(record["experience"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_raw_text_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;
        let long = "a".repeat(RAW_TEXT_CAP + 1234);

        let document_id = upload_docx(&app, "long.docx", &[long.as_str()]).await;
        let record = json_body(app.oneshot(get_request(&document_id)).await.unwrap()).await;

        let raw_text = record["raw_text"].as_str().unwrap();
        assert_eq!(raw_text.chars().count(), RAW_TEXT_CAP);
        assert!(long.starts_with(raw_text));
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), Arc::new(CannedExtractor(MODEL_JSON.into()))).await;

        let (first, second) = tokio::join!(
            upload_docx(&app, "first.docx", &["First candidate"]),
            upload_docx(&app, "second.docx", &["Second candidate"]),
        );
        assert_ne!(first, second);

        for (id, text) in [(&first, "First candidate"), (&second, "Second candidate")] {
            let response = app.clone().oneshot(get_request(id)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let record = json_body(response).await;
            assert_eq!(record["document_id"], id.as_str());
            assert!(record["raw_text"].as_str().unwrap().starts_with(text));
        }
    }
}
