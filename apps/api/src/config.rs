use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Application configuration loaded from environment variables.
/// The model endpoint and key are not part of it; see `llm_client::endpoint`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout_secs: match optional_env("LLM_TIMEOUT_SECS") {
                Some(raw) => parse_timeout(&raw)?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_timeout(raw: &str) -> Result<u64> {
    let secs = raw
        .parse::<u64>()
        .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;
    anyhow::ensure!(secs > 0, "LLM_TIMEOUT_SECS must be greater than zero");
    Ok(secs)
}
