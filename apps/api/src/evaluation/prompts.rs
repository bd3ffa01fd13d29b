//! Evaluation prompt: a fixed recruiter/ATS template with the scoring rubric
//! and the JSON schema the model must answer with.

use crate::errors::AppError;
use crate::evaluation::normalize::truncate_chars;
use crate::llm_client::prompts::{HONESTY_INSTRUCTION, JSON_ONLY_INSTRUCTION};

/// Upper bound on CV characters embedded in the prompt.
pub const MAX_CV_CHARS: usize = 15_000;

/// Evaluation prompt template.
/// Replace: {job_role}, {cv_text}, {honesty_instruction}, {json_only_instruction}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an expert recruiter and ATS (Applicant Tracking System) evaluator.

**Job Role:** {job_role}

**CV Content:**
{cv_text}

**Evaluation Criteria:**
1. Role Relevance (25%): How well does the CV match this job?
2. Skills Match (25%): What percentage of required skills are present?
3. Experience Fit (20%): Does the candidate have relevant experience?
4. Education Fit (15%): Does education match the role?
5. ATS Keyword Match (10%): Important keywords present?
6. Industry Alignment (5%): Industry fit. Penalize heavily for mismatch.

**Important:**
- {honesty_instruction}
- Set industryMatch=false for cross-industry mismatches
- Max 70 points if no relevant experience
- Max 80 points if key skills missing
- Overall score = weighted average of all 6 metrics
- Apply 50-point cap if industryMatch is false

**Output JSON only.** {json_only_instruction}
{
  "roleRelevance": number (0-100),
  "skillsMatch": number (0-100),
  "experienceFit": number (0-100),
  "educationFit": number (0-100),
  "atsKeywordMatch": number (0-100),
  "industryAlignment": number (0-100),
  "strengths": [3-5 items],
  "weaknesses": [3-5 items],
  "recommendations": [3-5 items],
  "matchedSkills": [skill names],
  "missingSkills": [skill names],
  "summary": "2-3 paragraph summary",
  "industryMatch": boolean,
  "isMatch": boolean (true if overall >= 70)
}"#;

/// The full input to one model call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    job_role: String,
    cv_text: String,
}

impl EvaluationRequest {
    /// Trims the role (must be non-empty) and caps the text at `MAX_CV_CHARS`.
    pub fn new(job_role: &str, normalized_text: &str) -> Result<Self, AppError> {
        let job_role = job_role.trim();
        if job_role.is_empty() {
            return Err(AppError::Validation("Job role is required".to_string()));
        }
        Ok(Self {
            job_role: job_role.to_string(),
            cv_text: truncate_chars(normalized_text, MAX_CV_CHARS).to_string(),
        })
    }

    pub fn job_role(&self) -> &str {
        &self.job_role
    }

    pub fn cv_text(&self) -> &str {
        &self.cv_text
    }
}

pub fn build_prompt(request: &EvaluationRequest) -> String {
    // CV text goes in last so that placeholder-like text inside the CV is
    // never substituted.
    EVALUATION_PROMPT_TEMPLATE
        .replace("{honesty_instruction}", HONESTY_INSTRUCTION)
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{job_role}", &request.job_role)
        .replace("{cv_text}", &request.cv_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::scoring::REQUIRED_FIELDS;

    #[test]
    fn test_request_trims_role() {
        let req = EvaluationRequest::new("  Software Engineer \n", "cv").unwrap();
        assert_eq!(req.job_role(), "Software Engineer");
    }

    #[test]
    fn test_request_rejects_blank_role() {
        for role in ["", "   ", "\t\n"] {
            let err = EvaluationRequest::new(role, "cv").unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == "Job role is required"));
        }
    }

    #[test]
    fn test_request_caps_text() {
        let long = "x".repeat(MAX_CV_CHARS + 500);
        let req = EvaluationRequest::new("Engineer", &long).unwrap();
        assert_eq!(req.cv_text().chars().count(), MAX_CV_CHARS);

        let short = EvaluationRequest::new("Engineer", "short cv").unwrap();
        assert_eq!(short.cv_text(), "short cv");
    }

    #[test]
    fn test_prompt_embeds_role_and_text() {
        let req = EvaluationRequest::new("Data Scientist", "Python pandas 5 years").unwrap();
        let prompt = build_prompt(&req);
        assert!(prompt.contains("**Job Role:** Data Scientist"));
        assert!(prompt.contains("**CV Content:**\nPython pandas 5 years"));
        assert!(prompt.contains(HONESTY_INSTRUCTION));
        assert!(prompt.contains(JSON_ONLY_INSTRUCTION));
        assert!(!prompt.contains("{job_role}"));
        assert!(!prompt.contains("{cv_text}"));
    }

    #[test]
    fn test_prompt_states_rubric_and_caps() {
        let prompt = build_prompt(&EvaluationRequest::new("Nurse", "cv").unwrap());
        for criterion in [
            "Role Relevance (25%)",
            "Skills Match (25%)",
            "Experience Fit (20%)",
            "Education Fit (15%)",
            "ATS Keyword Match (10%)",
            "Industry Alignment (5%)",
        ] {
            assert!(prompt.contains(criterion), "missing {criterion}");
        }
        assert!(prompt.contains("Max 70 points if no relevant experience"));
        assert!(prompt.contains("Max 80 points if key skills missing"));
        assert!(prompt.contains("Apply 50-point cap if industryMatch is false"));
    }

    #[test]
    fn test_prompt_lists_every_required_field() {
        let prompt = build_prompt(&EvaluationRequest::new("Nurse", "cv").unwrap());
        for field in REQUIRED_FIELDS {
            assert!(prompt.contains(&format!("\"{field}\"")), "schema misses {field}");
        }
    }

    #[test]
    fn test_placeholders_in_cv_are_left_alone() {
        let req = EvaluationRequest::new("Engineer", "my cv mentions {job_role} literally").unwrap();
        assert!(build_prompt(&req).contains("my cv mentions {job_role} literally"));
    }
}
