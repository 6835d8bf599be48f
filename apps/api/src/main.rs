mod config;
mod errors;
mod llm_client;
mod models;
mod resumes;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, SUPPORTED_PROVIDER};
use crate::resumes::structured::LlmStructuredExtractor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Parser API v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let store = JsonFileStore::open(&config.metadata_file).await?;
    info!("Metadata store ready at {}", store.path().display());

    let llm = LlmClient::new(&config);
    if llm.provider() != SUPPORTED_PROVIDER {
        warn!(
            "LLM_PROVIDER '{}' is not supported; uploads will fail until it is set to '{SUPPORTED_PROVIDER}'",
            llm.provider()
        );
    } else if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY is not set; uploads will fail at the extraction step");
    }
    info!("LLM client initialized (provider: {}, model: {})", llm.provider(), llm.model());

    let state = AppState {
        store: Arc::new(store),
        extractor: Arc::new(LlmStructuredExtractor(llm)),
        config: config.clone(),
    };

    // The review front-end runs on its own origin.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
