mod config;
mod policy;
mod rules;

pub use config::ScoringConfig;
pub use policy::FlightDecision;

use serde::{Deserialize, Serialize};

use super::super::catalog::RiskCatalog;
use super::domain::QuestionResponse;
use super::validation::{validate_responses, ValidationError};
use policy::{decide_outcome, outcome_message};

/// Stateless evaluator applying the catalog rubric to a response set.
///
/// A pure function of `(catalog snapshot, responses, config)`: no I/O, no
/// logging, no retries. Evaluations are independent, so callers may run as
/// many as they like concurrently against the same snapshot.
pub struct EvaluationEngine {
    config: ScoringConfig,
}

impl EvaluationEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ScoringConfig {
        self.config
    }

    pub fn evaluate(
        &self,
        catalog: &RiskCatalog,
        responses: &[QuestionResponse],
    ) -> Result<AssessmentOutcome, EvaluationError> {
        validate_responses(catalog, responses)?;

        let (scores, total_score, signals) = rules::score_responses(catalog, responses)?;

        let decision = decide_outcome(total_score, &self.config, &signals);
        let message = outcome_message(decision, total_score, &self.config, &signals);

        Ok(AssessmentOutcome {
            decision,
            total_score,
            max_allowed_score: self.config.max_allowed_score,
            has_disqualifying_answers: signals.disqualifier.is_some(),
            message,
            scores,
        })
    }
}

/// Discrete contribution to an assessment, kept for transparent review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: String,
    pub category_id: String,
    pub risk_score: u32,
    pub is_disqualifying: bool,
    pub notes: String,
}

/// Evaluation output describing the verdict and per-question score trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub decision: FlightDecision,
    pub total_score: u32,
    pub max_allowed_score: u32,
    pub has_disqualifying_answers: bool,
    pub message: String,
    pub scores: Vec<QuestionScore>,
}

/// Failures surfaced by an evaluation. None of these are retried: the
/// engine is pure, so the same inputs would fail the same way again.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("response for question {question_id} references unknown option {option_id}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },
    #[error("value {value} for question {question_id} falls outside every configured range")]
    UnscorableValue { question_id: String, value: f64 },
}
