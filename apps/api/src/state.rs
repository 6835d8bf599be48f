use std::sync::Arc;

use crate::config::Config;
use crate::resumes::structured::StructuredExtractor;
use crate::store::MetadataStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable metadata store. Default: JsonFileStore on `METADATA_FILE`.
    pub store: Arc<dyn MetadataStore>,
    /// Pluggable structured extractor. Default: LlmStructuredExtractor.
    pub extractor: Arc<dyn StructuredExtractor>,
}
