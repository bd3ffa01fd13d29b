//! Response validation and the composite score.
//!
//! The model's reply is checked for all required fields, coerced into
//! `EvaluationMetrics`, and given an `overall_score` computed here. Any
//! `overallScore` the model emits is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

pub const REQUIRED_FIELDS: [&str; 14] = [
    "roleRelevance",
    "skillsMatch",
    "experienceFit",
    "educationFit",
    "atsKeywordMatch",
    "industryAlignment",
    "strengths",
    "weaknesses",
    "recommendations",
    "matchedSkills",
    "missingSkills",
    "summary",
    "industryMatch",
    "isMatch",
];

/// Ceiling applied to the overall score when the CV is from another industry.
pub const INDUSTRY_MISMATCH_CAP: u32 = 50;

/// Per-criterion weights in percent. Must sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub role_relevance: u32,
    pub skills_match: u32,
    pub experience_fit: u32,
    pub education_fit: u32,
    pub ats_keyword_match: u32,
    pub industry_alignment: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            role_relevance: 25,
            skills_match: 25,
            experience_fit: 20,
            education_fit: 15,
            ats_keyword_match: 10,
            industry_alignment: 5,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> u32 {
        self.role_relevance
            + self.skills_match
            + self.experience_fit
            + self.education_fit
            + self.ats_keyword_match
            + self.industry_alignment
    }
}

/// The six sub-scores, each an integer in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub role_relevance: u32,
    pub skills_match: u32,
    pub experience_fit: u32,
    pub education_fit: u32,
    pub ats_keyword_match: u32,
    pub industry_alignment: u32,
}

/// Evaluation result returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetrics {
    pub overall_score: u32,
    #[serde(flatten)]
    pub scores: SubScores,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: String,
    pub industry_match: bool,
    pub is_match: bool,
}

/// `round(Σ weight·score / 100)`, rounding halves up, then capped at
/// `INDUSTRY_MISMATCH_CAP` when `industry_match` is false.
///
/// Integer arithmetic keeps the result exact at .5 boundaries.
pub fn compute_overall_score(
    scores: &SubScores,
    industry_match: bool,
    weights: &ScoringWeights,
) -> u32 {
    let weighted = weights.role_relevance * scores.role_relevance
        + weights.skills_match * scores.skills_match
        + weights.experience_fit * scores.experience_fit
        + weights.education_fit * scores.education_fit
        + weights.ats_keyword_match * scores.ats_keyword_match
        + weights.industry_alignment * scores.industry_alignment;
    let total = weights.total().max(1);
    let overall = (weighted * 2 + total) / (total * 2);

    if industry_match {
        overall
    } else {
        overall.min(INDUSTRY_MISMATCH_CAP)
    }
}

/// Validates the parsed model reply and builds the scored metrics.
///
/// Fails on the first missing field (in `REQUIRED_FIELDS` order) or on the
/// first field with an unusable value. Never returns partial metrics.
pub fn validate_response(
    value: &Value,
    weights: &ScoringWeights,
) -> Result<EvaluationMetrics, AppError> {
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::AiEvaluation("Invalid AI response format".to_string()))?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
        return Err(AppError::AiEvaluation(format!("Missing field: {missing}")));
    }

    let scores = SubScores {
        role_relevance: score_field(value, "roleRelevance")?,
        skills_match: score_field(value, "skillsMatch")?,
        experience_fit: score_field(value, "experienceFit")?,
        education_fit: score_field(value, "educationFit")?,
        ats_keyword_match: score_field(value, "atsKeywordMatch")?,
        industry_alignment: score_field(value, "industryAlignment")?,
    };
    let industry_match = bool_field(value, "industryMatch")?;

    Ok(EvaluationMetrics {
        overall_score: compute_overall_score(&scores, industry_match, weights),
        scores,
        strengths: list_field(value, "strengths")?,
        weaknesses: list_field(value, "weaknesses")?,
        recommendations: list_field(value, "recommendations")?,
        matched_skills: list_field(value, "matchedSkills")?,
        missing_skills: list_field(value, "missingSkills")?,
        summary: string_field(value, "summary")?,
        industry_match,
        is_match: bool_field(value, "isMatch")?,
    })
}

fn invalid(field: &str) -> AppError {
    AppError::AiEvaluation(format!("Invalid value for field: {field}"))
}

/// Numbers (or numeric strings) rounded and clamped into [0, 100].
fn score_field(value: &Value, field: &str) -> Result<u32, AppError> {
    let raw = match &value[field] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| invalid(field))?;

    Ok(raw.round().clamp(0.0, 100.0) as u32)
}

fn bool_field(value: &Value, field: &str) -> Result<bool, AppError> {
    match &value[field] {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(invalid(field)),
    }
}

fn string_field(value: &Value, field: &str) -> Result<String, AppError> {
    value[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(field))
}

/// Arrays of scalars; non-string scalars are kept in their JSON form.
fn list_field(value: &Value, field: &str) -> Result<Vec<String>, AppError> {
    let items = value[field].as_array().ok_or_else(|| invalid(field))?;
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Number(_) | Value::Bool(_) => Ok(item.to_string()),
            _ => Err(invalid(field)),
        })
        .collect()
}
