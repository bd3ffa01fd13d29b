//! Endpoint resolution for the model API.
//!
//! Sources are passed in explicitly as an `EndpointSources` snapshot, so the
//! lookup order is testable without touching the real filesystem or env.
//! Order: each candidate JSON file in turn, then environment variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE_NAME: &str = ".cvscore-llm.json";
pub const SYSTEM_CONFIG_PATH: &str = "/etc/cvscore/llm.json";
pub const BASE_URL_VAR: &str = "LLM_BASE_URL";
pub const API_KEY_VAR: &str = "LLM_API_KEY";

/// Resolved endpoint for the chat completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmEndpoint {
    pub base_url: String,
    pub api_key: String,
}

impl LlmEndpoint {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Everything endpoint resolution is allowed to look at.
#[derive(Debug, Clone, Default)]
pub struct EndpointSources {
    pub candidate_paths: Vec<PathBuf>,
    pub env: HashMap<String, String>,
}

impl EndpointSources {
    /// Snapshot of the running process: cwd, home and system config paths plus
    /// the current environment.
    pub fn from_process() -> Self {
        Self {
            candidate_paths: default_candidate_paths(
                std::env::current_dir().ok(),
                dirs::home_dir(),
            ),
            env: std::env::vars().collect(),
        }
    }
}

pub fn default_candidate_paths(cwd: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Some(cwd) = cwd {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(home) = home {
        paths.push(home.join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
    paths
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointFile {
    base_url: Option<String>,
    api_key: Option<String>,
}

/// First source that yields both a base URL and an API key, or `None`.
pub fn resolve_endpoint(sources: &EndpointSources) -> Option<LlmEndpoint> {
    sources
        .candidate_paths
        .iter()
        .find_map(|path| load_from_path(path))
        .or_else(|| from_env(&sources.env))
}

/// Loads an endpoint from one config file. Missing files are skipped quietly;
/// unreadable or malformed ones are logged and skipped.
fn load_from_path(path: &Path) -> Option<LlmEndpoint> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Error reading LLM config {}: {e}", path.display());
            return None;
        }
    };
    let file: EndpointFile = match serde_json::from_str(&content) {
        Ok(f) => f,
        Err(e) => {
            warn!("Error parsing LLM config {}: {e}", path.display());
            return None;
        }
    };
    complete_pair(file.base_url, file.api_key)
}

fn from_env(env: &HashMap<String, String>) -> Option<LlmEndpoint> {
    complete_pair(env.get(BASE_URL_VAR).cloned(), env.get(API_KEY_VAR).cloned())
}

fn complete_pair(base_url: Option<String>, api_key: Option<String>) -> Option<LlmEndpoint> {
    let base_url = base_url.filter(|s| !s.trim().is_empty())?;
    let api_key = api_key.filter(|s| !s.trim().is_empty())?;
    Some(LlmEndpoint { base_url, api_key })
}
