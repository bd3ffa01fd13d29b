use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every pipeline stage raises one of these as soon as it detects a failure;
/// only `into_response` translates them to HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing input.
    #[error("{0}")]
    Validation(String),

    /// The document could not be turned into usable text.
    #[error("{0}")]
    FileProcessing(String),

    /// Model, network, or response-schema failure.
    #[error("{0}")]
    AiEvaluation(String),

    #[error("{0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::FileProcessing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AiEvaluation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::FileProcessing(_) => "FILE_PROCESSING_ERROR",
            AppError::AiEvaluation(_) => "AI_EVALUATION_ERROR",
            AppError::Timeout(_) => "AI_TIMEOUT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout { secs } => {
                AppError::Timeout(format!("AI evaluation timed out after {secs} seconds"))
            }
            LlmError::Api { .. } | LlmError::EmptyContent | LlmError::InvalidFormat => {
                AppError::AiEvaluation(err.to_string())
            }
            LlmError::Config | LlmError::Http(_) => {
                AppError::AiEvaluation(format!("AI evaluation failed: {err}"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::AiEvaluation(msg) | AppError::Timeout(msg) => {
                tracing::error!("{code}: {msg}");
                msg.clone()
            }
            AppError::Validation(msg) | AppError::FileProcessing(msg) => {
                tracing::warn!("{code}: {msg}");
                msg.clone()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
