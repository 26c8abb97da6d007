use std::fmt;
use thiserror::Error;

/// The workflow step a backend failure is attributed to. Retrying re-invokes
/// exactly this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    ProfileExtraction,
    QuestionGeneration,
    CareerRecommendation,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Upload => "upload",
            Step::ProfileExtraction => "profile extraction",
            Step::QuestionGeneration => "question generation",
            Step::CareerRecommendation => "career recommendation",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad input rejected before any request is made. The workflow state does
    /// not change.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend rejected a call (non-2xx status, transport failure, or an
    /// error payload). The workflow moves to Failed and the step can be
    /// retried.
    #[error("backend error during {step}: {message}")]
    Backend { step: Step, message: String },

    /// Model output could not be parsed as structured data. Non-fatal: the
    /// raw text is retained and the workflow advances.
    #[error("parse error: {0}")]
    Parse(String),
}

impl WorkflowError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::Backend { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_names_the_step() {
        let err = WorkflowError::Backend {
            step: Step::QuestionGeneration,
            message: "503 Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backend error during question generation: 503 Service Unavailable"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_error_is_not_retryable() {
        let err = WorkflowError::Validation("Only PDF files are supported".to_string());
        assert!(!err.is_retryable());
    }
}
