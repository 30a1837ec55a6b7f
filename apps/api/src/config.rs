use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Candidate models in order of preference. Overridable via `CANDIDATE_MODELS`.
pub const DEFAULT_CANDIDATE_MODELS: &[&str] = &[
    "qwen/qwen-2.5-72b-instruct:free",
    "meta-llama/llama-3.2-3b-instruct:free",
    "microsoft/phi-3-mini-128k-instruct:free",
    "google/gemma-2-9b-it:free",
];

/// Application configuration loaded from environment variables.
///
/// The completion-service key is optional here: a missing key is reported per
/// request so the health and catalogue endpoints still come up.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub candidate_models: Vec<String>,
    pub app_referer: String,
    pub app_title: String,
    pub http_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            candidate_models: optional_env("CANDIDATE_MODELS")
                .map(|raw| parse_model_list(&raw))
                .filter(|models| !models.is_empty())
                .unwrap_or_else(default_candidate_models),
            app_referer: optional_env("APP_REFERER")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            app_title: optional_env("APP_TITLE").unwrap_or_else(|| "AI Career Coach".to_string()),
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 2 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

pub fn default_candidate_models() -> Vec<String> {
    DEFAULT_CANDIDATE_MODELS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

/// Splits a comma-separated model list, dropping blank entries.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

/// Reads a variable, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
