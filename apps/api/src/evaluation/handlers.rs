//! Axum route handlers for the CV evaluation API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::pipeline::{evaluate_cv, PipelineRun, PipelineStage};
use crate::evaluation::scoring::EvaluationMetrics;
use crate::evaluation::upload::{parse_multipart, ALLOWED_MIME_TYPES, MAX_FILE_SIZE};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub success: bool,
    pub result: EvaluationMetrics,
    pub request_id: Uuid,
}

/// POST /api/cv-evaluate
///
/// Multipart fields: `file` (PDF/DOC/DOCX, ≤ 5 MiB) and `jobRole`.
/// Every log line for the request carries its `request_id`.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("cv_evaluate", %request_id);

    async move {
        let mut run = PipelineRun::new();
        let form = match multipart {
            Ok(multipart) => parse_multipart(multipart).await,
            Err(rejection) => Err(AppError::Validation(format!(
                "Expected multipart form data: {rejection}"
            ))),
        };
        let form = form.inspect_err(|e| run.fail(e))?;

        let result = evaluate_cv(&mut run, form, state.llm.as_ref(), &state.weights).await?;

        run.advance(PipelineStage::Responded);
        info!("CV evaluation complete");
        Ok(Json(EvaluateResponse {
            success: true,
            result,
            request_id,
        }))
    }
    .instrument(span)
    .await
}

/// GET /api/cv-evaluate
///
/// Static description of the endpoint.
pub async fn handle_describe(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "endpoint": "/api/cv-evaluate",
        "method": "POST",
        "description": "Evaluate CV against job role using AI",
        "accepts": "PDF or DOCX (max 5MB)",
        "fields": ["file", "jobRole"],
        "mimeTypes": ALLOWED_MIME_TYPES,
        "maxFileSize": MAX_FILE_SIZE,
        "model": state.config.llm_model,
    }))
}
