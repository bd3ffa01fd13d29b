//! CV evaluation pipeline. Sequences one request through every stage.
//!
//! Flow: Received → Validated → Extracted → Normalized → Evaluated → Responded,
//! or Failed from any stage. Each stage runs once; nothing is retried.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::evaluation::extract::{extractor_for, is_too_short};
use crate::evaluation::normalize::{normalize_text, truncate_chars};
use crate::evaluation::prompts::{build_prompt, EvaluationRequest};
use crate::evaluation::scoring::{validate_response, EvaluationMetrics, ScoringWeights};
use crate::evaluation::upload::{
    signature_matches, sniff_signature, validate_document, EvaluationForm,
};
use crate::llm_client::ChatCompletion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Extracted,
    Normalized,
    Evaluated,
    Responded,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Extracted => "extracted",
            PipelineStage::Normalized => "normalized",
            PipelineStage::Evaluated => "evaluated",
            PipelineStage::Responded => "responded",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the furthest stage reached so a failure can report where it stopped.
#[derive(Debug)]
pub struct PipelineRun {
    stage: PipelineStage,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn advance(&mut self, stage: PipelineStage) {
        debug!("stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Moves to `Failed`, logging the error against the stage it interrupted.
    pub fn fail(&mut self, err: &AppError) {
        error!(after_stage = %self.stage, "CV evaluation failed: {err}");
        self.stage = PipelineStage::Failed;
    }
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs validation → extraction → normalization → model call → scoring.
///
/// The job role is checked before the file so a blank role never costs any
/// file processing.
pub async fn evaluate_cv(
    run: &mut PipelineRun,
    form: EvaluationForm,
    llm: &dyn ChatCompletion,
    weights: &ScoringWeights,
) -> Result<EvaluationMetrics, AppError> {
    let result = run_stages(run, form, llm, weights).await;
    if let Err(err) = &result {
        run.fail(err);
    }
    result
}

async fn run_stages(
    run: &mut PipelineRun,
    form: EvaluationForm,
    llm: &dyn ChatCompletion,
    weights: &ScoringWeights,
) -> Result<EvaluationMetrics, AppError> {
    let job_role = form
        .job_role
        .as_deref()
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .ok_or_else(|| AppError::Validation("Job role is required".to_string()))?;

    let kind = validate_document(form.file.as_ref())?;
    let Some(document) = form.file else {
        return Err(AppError::Validation("No file provided".to_string()));
    };
    info!(
        "File: {}, {} bytes, {}",
        document.filename, document.size, document.content_type
    );
    if !signature_matches(&document.content_type, sniff_signature(&document.bytes)) {
        warn!(
            "Declared type {} does not match file signature of {}",
            document.content_type, document.filename
        );
    }
    run.advance(PipelineStage::Validated);

    let raw_text = extractor_for(kind).extract(document.bytes).await?;
    info!("Extracted text: {} chars", raw_text.chars().count());
    debug!("Preview: {}", truncate_chars(&raw_text, 200));
    run.advance(PipelineStage::Extracted);

    let normalized = normalize_text(&raw_text);
    if is_too_short(&normalized) {
        return Err(AppError::FileProcessing(
            "Extracted text too short for evaluation".to_string(),
        ));
    }
    run.advance(PipelineStage::Normalized);

    let request = EvaluationRequest::new(job_role, &normalized)?;
    let prompt = build_prompt(&request);
    info!(
        "Calling model for role '{}', prompt length: {}",
        request.job_role(),
        prompt.chars().count()
    );
    let reply = llm.complete_json(&prompt).await?;
    let metrics = validate_response(&reply, weights)?;
    info!(
        "Score: {} (industry match: {}, is match: {})",
        metrics.overall_score, metrics.industry_match, metrics.is_match
    );
    run.advance(PipelineStage::Evaluated);

    Ok(metrics)
}
