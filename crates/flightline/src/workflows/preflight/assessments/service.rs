use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::super::catalog::{CatalogError, RiskCatalog};
use super::domain::{AssessmentId, AssessmentSubmission};
use super::evaluation::{EvaluationEngine, EvaluationError, FlightDecision, ScoringConfig};
use super::repository::{
    AlertError, AlertPublisher, AssessmentRecord, AssessmentRepository, DispatchAlert,
    InstructorOverride, RepositoryError,
};

/// Service composing the catalog snapshot, scoring engine, repository, and
/// alert hook. Submissions are evaluated synchronously; the verdict is part
/// of the stored record from the start.
pub struct AssessmentService<R, A> {
    catalog: Arc<RiskCatalog>,
    repository: Arc<R>,
    alerts: Arc<A>,
    engine: Arc<EvaluationEngine>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asmt-{id:06}"))
}

impl<R, A> AssessmentService<R, A>
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    /// Build a service over a published catalog snapshot. The snapshot is
    /// validated here with the same routine the catalog editor uses, so a
    /// broken rubric never reaches the scorer.
    pub fn new(
        catalog: RiskCatalog,
        repository: Arc<R>,
        alerts: Arc<A>,
        config: ScoringConfig,
    ) -> Result<Self, CatalogError> {
        catalog.validate()?;

        Ok(Self {
            catalog: Arc::new(catalog),
            repository,
            alerts,
            engine: Arc::new(EvaluationEngine::new(config)),
        })
    }

    pub fn catalog(&self) -> &RiskCatalog {
        &self.catalog
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.engine.config()
    }

    /// Evaluate a submission and persist the record, alerting dispatch when
    /// the verdict is NO-GO.
    pub fn submit(
        &self,
        submission: AssessmentSubmission,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let outcome = self
            .engine
            .evaluate(&self.catalog, &submission.responses)?;

        let record = AssessmentRecord {
            assessment_id: next_assessment_id(),
            student_id: submission.student_id,
            flight_session_id: submission.flight_session_id,
            completed_at: Utc::now(),
            notes: submission.notes,
            responses: submission.responses,
            outcome,
            instructor_override: None,
        };

        let stored = self.repository.insert(record)?;

        if stored.outcome.decision == FlightDecision::NoGo {
            let mut details = BTreeMap::new();
            details.insert("result".to_string(), stored.outcome.decision.label().to_string());
            details.insert("student_id".to_string(), stored.student_id.clone());
            details.insert(
                "total_score".to_string(),
                stored.outcome.total_score.to_string(),
            );
            self.alerts.publish(DispatchAlert {
                template: "assessment_no_go".to_string(),
                assessment_id: stored.assessment_id.clone(),
                details,
            })?;
        }

        Ok(stored)
    }

    pub fn get(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Replace the recorded verdict on an instructor's authority. The
    /// engine's outcome stays on the record for audit.
    pub fn override_decision(
        &self,
        assessment_id: &AssessmentId,
        instructor_id: &str,
        reason: &str,
        new_decision: FlightDecision,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        if reason.trim().is_empty() {
            return Err(AssessmentServiceError::MissingOverrideReason);
        }

        let mut record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;

        record.instructor_override = Some(InstructorOverride {
            instructor_id: instructor_id.to_string(),
            reason: reason.trim().to_string(),
            new_decision,
            applied_at: Utc::now(),
        });

        self.repository.update(record.clone())?;
        Ok(record)
    }

    pub fn student_history(
        &self,
        student_id: &str,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.for_student(student_id, limit)?)
    }

    pub fn no_go_assessments(
        &self,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.no_go(limit)?)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error("an override reason is required")]
    MissingOverrideReason,
}
