//! Preflight assessment intake, scoring, and instructor review.
//!
//! The scoring engine itself is a pure function over a catalog snapshot and
//! a response set; everything stateful (persistence, alerting, HTTP) hangs
//! off the service facade through the traits in [`repository`].

pub mod domain;
pub(crate) mod evaluation;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{AssessmentId, AssessmentSubmission, QuestionResponse};
pub use evaluation::{
    AssessmentOutcome, EvaluationEngine, EvaluationError, FlightDecision, QuestionScore,
    ScoringConfig,
};
pub use repository::{
    AlertError, AlertPublisher, AssessmentDetailView, AssessmentRecord, AssessmentRepository,
    AssessmentResultView, DispatchAlert, InstructorOverride, RepositoryError,
};
pub use router::{assessment_router, OverrideRequest};
pub use service::{AssessmentService, AssessmentServiceError};
pub use validation::{
    validate_responses, ResponseIssue, ResponseIssueReason, ValidationError,
};
