use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::scoring::ScoringWeights;
use crate::llm_client::ChatCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Chat-completion backend. `LlmClient` in production, scripted models in tests.
    pub llm: Arc<dyn ChatCompletion>,
    pub config: Config,
    pub weights: ScoringWeights,
}
