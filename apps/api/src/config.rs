use std::time::Duration;

use anyhow::{Context, Result};

use crate::errors::AppError;

/// Default character ceiling for prompts sent to the hosted model.
const DEFAULT_PROMPT_CHAR_BUDGET: usize = 12_000;
/// Default per-call timeout for outbound provider requests.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded once from environment variables at startup.
/// All four provider secrets are required — startup fails with a clear message
/// if any is absent, so the pipeline never discovers a missing credential
/// mid-request.
#[derive(Debug, Clone)]
pub struct Config {
    pub scraper_api_key: String,
    pub scraper_base_url: String,
    pub inference_api_key: String,
    pub inference_model_url: String,
    pub trace_api_key: String,
    pub trace_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout: Duration,
    pub prompt_char_budget: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            scraper_api_key: require_env("FIRECRAWL_API_KEY")?,
            scraper_base_url: std::env::var("SCRAPER_BASE_URL")
                .unwrap_or_else(|_| "https://api.firecrawl.dev".to_string()),
            inference_api_key: require_env("HF_API_KEY")?,
            inference_model_url: require_env("HF_MODEL_URL")?,
            trace_api_key: require_env("OPIK_API_KEY")?,
            trace_base_url: std::env::var("OPIK_URL")
                .unwrap_or_else(|_| "https://www.comet.com/opik/api".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
                    .parse::<u64>()
                    .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ),
            prompt_char_budget: std::env::var("PROMPT_CHAR_BUDGET")
                .unwrap_or_else(|_| DEFAULT_PROMPT_CHAR_BUDGET.to_string())
                .parse::<usize>()
                .context("PROMPT_CHAR_BUDGET must be a character count")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::ConfigurationMissing(key.to_string()).into()),
    }
}
