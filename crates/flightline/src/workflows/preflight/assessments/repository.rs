use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentId, QuestionResponse};
use super::evaluation::{AssessmentOutcome, FlightDecision};

/// Stored assessment: who flew, what they answered, and the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub assessment_id: AssessmentId,
    pub student_id: String,
    pub flight_session_id: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub responses: Vec<QuestionResponse>,
    pub outcome: AssessmentOutcome,
    pub instructor_override: Option<InstructorOverride>,
}

/// An instructor replacing the engine's verdict, with the reason on record.
/// The original outcome is never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorOverride {
    pub instructor_id: String,
    pub reason: String,
    pub new_decision: FlightDecision,
    pub applied_at: DateTime<Utc>,
}

impl AssessmentRecord {
    /// Verdict after any instructor override.
    pub fn effective_decision(&self) -> FlightDecision {
        self.instructor_override
            .as_ref()
            .map(|entry| entry.new_decision)
            .unwrap_or(self.outcome.decision)
    }

    pub fn result_view(&self) -> AssessmentResultView {
        AssessmentResultView {
            assessment_id: self.assessment_id.clone(),
            result: self.effective_decision().label(),
            total_score: self.outcome.total_score,
            max_allowed_score: self.outcome.max_allowed_score,
            has_disqualifying_answers: self.outcome.has_disqualifying_answers,
            message: self.outcome.message.clone(),
            overridden: self.instructor_override.is_some(),
        }
    }

    pub fn detail_view(&self) -> AssessmentDetailView {
        AssessmentDetailView {
            summary: self.result_view(),
            student_id: self.student_id.clone(),
            flight_session_id: self.flight_session_id.clone(),
            completed_at: self.completed_at,
            notes: self.notes.clone(),
            scores: self.outcome.scores.clone(),
            instructor_override: self.instructor_override.clone(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    /// Most recent assessments for one student, newest first.
    fn for_student(
        &self,
        student_id: &str,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError>;
    /// Most recent NO-GO verdicts across all students, newest first.
    fn no_go(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Trait describing outbound alert hooks (e.g., dispatch desk or e-mail
/// adapters notified when a NO-GO is recorded).
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: DispatchAlert) -> Result<(), AlertError>;
}

/// Simple alert payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchAlert {
    pub template: String,
    pub assessment_id: AssessmentId,
    pub details: BTreeMap<String, String>,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized verdict summary exposed to submitters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResultView {
    pub assessment_id: AssessmentId,
    pub result: &'static str,
    pub total_score: u32,
    pub max_allowed_score: u32,
    pub has_disqualifying_answers: bool,
    pub message: String,
    pub overridden: bool,
}

/// Full review payload for instructors: summary plus the score trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentDetailView {
    #[serde(flatten)]
    pub summary: AssessmentResultView,
    pub student_id: String,
    pub flight_session_id: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub scores: Vec<super::evaluation::QuestionScore>,
    pub instructor_override: Option<InstructorOverride>,
}
