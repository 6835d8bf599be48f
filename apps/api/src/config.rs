use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_PROVIDER: &str = "groq";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Read once at startup and handed to each component explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub llm_provider: String,
    /// Checked when the first extraction runs, not at startup.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_api_url: String,
    pub upload_dir: PathBuf,
    pub metadata_file: PathBuf,
    /// Lower-cased, without the leading dot.
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            log_level: env_or("LOG_LEVEL", "info").to_lowercase(),
            llm_provider: env_or("LLM_PROVIDER", DEFAULT_PROVIDER).to_lowercase(),
            groq_api_key: optional_env("GROQ_API_KEY"),
            groq_model: env_or("GROQ_MODEL", DEFAULT_MODEL),
            groq_api_url: env_or("GROQ_API_URL", DEFAULT_API_URL),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "./data/uploads")),
            metadata_file: PathBuf::from(env_or("METADATA_FILE", "./data/data.json")),
            allowed_extensions: parse_extensions(&env_or("ALLOWED_EXTENSIONS", "pdf,docx,doc")),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
        })
    }

    /// Case-insensitive membership test against `allowed_extensions`.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config(root: &std::path::Path) -> Config {
    Config {
        log_level: "debug".to_string(),
        llm_provider: DEFAULT_PROVIDER.to_string(),
        groq_api_key: None,
        groq_model: DEFAULT_MODEL.to_string(),
        groq_api_url: DEFAULT_API_URL.to_string(),
        upload_dir: root.join("uploads"),
        metadata_file: root.join("data.json"),
        allowed_extensions: parse_extensions("pdf,docx,doc"),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        port: 0,
    }
}
