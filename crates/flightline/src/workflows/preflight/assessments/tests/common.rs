use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::preflight::assessments::domain::{
    AssessmentId, AssessmentSubmission, QuestionResponse,
};
use crate::workflows::preflight::assessments::evaluation::{EvaluationEngine, ScoringConfig};
use crate::workflows::preflight::assessments::repository::{
    AlertError, AlertPublisher, AssessmentRecord, AssessmentRepository, DispatchAlert,
    RepositoryError,
};
use crate::workflows::preflight::assessments::{assessment_router, AssessmentService};
use crate::workflows::preflight::catalog::{
    AnswerOption, Category, NumericRange, Question, QuestionScoring, RiskCatalog,
};

pub(super) fn category(id: &str, name: &str, order: u32) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        display_order: order,
    }
}

pub(super) fn option(id: &str, text: &str, risk_score: u32, is_disqualifying: bool) -> AnswerOption {
    AnswerOption {
        id: id.to_string(),
        answer_text: text.to_string(),
        risk_score,
        is_disqualifying,
        display_order: 0,
    }
}

pub(super) fn range(
    id: &str,
    min_value: Option<f64>,
    max_value: Option<f64>,
    risk_score: u32,
    is_disqualifying: bool,
) -> NumericRange {
    NumericRange {
        id: id.to_string(),
        min_value,
        max_value,
        risk_score,
        is_disqualifying,
        range_label: None,
    }
}

pub(super) fn choice_question(
    id: &str,
    category_id: &str,
    text: &str,
    options: Vec<AnswerOption>,
) -> Question {
    let is_disqualifying = options.iter().any(|option| option.is_disqualifying);
    Question {
        id: id.to_string(),
        category_id: category_id.to_string(),
        question_text: text.to_string(),
        is_disqualifying,
        help_text: None,
        is_active: true,
        display_order: 0,
        scoring: QuestionScoring::MultipleChoice { options },
    }
}

pub(super) fn numeric_question(
    id: &str,
    category_id: &str,
    text: &str,
    ranges: Vec<NumericRange>,
) -> Question {
    let is_disqualifying = ranges.iter().any(|range| range.is_disqualifying);
    Question {
        id: id.to_string(),
        category_id: category_id.to_string(),
        question_text: text.to_string(),
        is_disqualifying,
        help_text: None,
        is_active: true,
        display_order: 0,
        scoring: QuestionScoring::Numeric { ranges },
    }
}

/// Representative flight-school catalog: pilot readiness plus weather, with
/// one retired question that must never appear in new assessments.
pub(super) fn catalog() -> RiskCatalog {
    let mut questions = vec![
        numeric_question(
            "q-sleep",
            "cat-pilot",
            "How many hours did you sleep in the last 24 hours?",
            vec![
                range("r-sleep-short", None, Some(4.0), 8, false),
                range("r-sleep-fair", Some(4.0), Some(6.0), 4, false),
                range("r-sleep-full", Some(6.0), None, 0, false),
            ],
        ),
        choice_question(
            "q-experience",
            "cat-pilot",
            "Flight time in type during the last 90 days",
            vec![
                option("opt-exp-high", "More than 10 hours", 0, false),
                option("opt-exp-mid", "Between 2 and 10 hours", 2, false),
                option("opt-exp-low", "Less than 2 hours", 4, false),
            ],
        ),
        choice_question(
            "q-illness",
            "cat-pilot",
            "Are you experiencing symptoms of illness?",
            vec![
                option("opt-ill-none", "No symptoms", 0, false),
                option("opt-ill-minor", "Minor cold symptoms", 3, false),
                option("opt-ill-impairing", "Symptoms affecting concentration", 0, true),
            ],
        ),
        choice_question(
            "q-wind",
            "cat-weather",
            "Forecast surface wind at departure",
            vec![
                option("opt-wind-calm", "Below 10 knots", 0, false),
                option("opt-wind-moderate", "10 to 20 knots", 3, false),
                option("opt-wind-strong", "Gusting above 20 knots", 5, false),
            ],
        ),
        numeric_question(
            "q-ceiling",
            "cat-weather",
            "Reported ceiling at departure (feet AGL)",
            vec![
                range("r-ceiling-low", None, Some(1000.0), 6, false),
                range("r-ceiling-marginal", Some(1000.0), Some(3000.0), 3, false),
                range("r-ceiling-vfr", Some(3000.0), None, 0, false),
            ],
        ),
    ];

    let mut retired = choice_question(
        "q-retired",
        "cat-pilot",
        "Have you reviewed the retired checklist?",
        vec![option("opt-retired-yes", "Yes", 0, false)],
    );
    retired.is_active = false;
    questions.push(retired);

    RiskCatalog {
        categories: vec![
            category("cat-pilot", "Pilot", 1),
            category("cat-weather", "Weather", 2),
        ],
        questions,
    }
}

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig::new(20, 15)
}

pub(super) fn evaluation_engine() -> EvaluationEngine {
    EvaluationEngine::new(scoring_config())
}

/// All five active questions answered with their zero-risk choices.
pub(super) fn clean_responses() -> Vec<QuestionResponse> {
    vec![
        QuestionResponse::numeric("q-sleep", 8.0),
        QuestionResponse::choice("q-experience", "opt-exp-high"),
        QuestionResponse::choice("q-illness", "opt-ill-none"),
        QuestionResponse::choice("q-wind", "opt-wind-calm"),
        QuestionResponse::numeric("q-ceiling", 4000.0),
    ]
}

/// Same set with the disqualifying illness answer swapped in.
pub(super) fn disqualified_responses() -> Vec<QuestionResponse> {
    clean_responses()
        .into_iter()
        .map(|response| {
            if response.question_id == "q-illness" {
                QuestionResponse::choice("q-illness", "opt-ill-impairing")
            } else {
                response
            }
        })
        .collect()
}

pub(super) fn submission(responses: Vec<QuestionResponse>) -> AssessmentSubmission {
    AssessmentSubmission {
        student_id: "stu-001".to_string(),
        flight_session_id: Some("session-17".to_string()),
        responses,
        notes: None,
    }
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryRepository, MemoryAlerts>,
    Arc<MemoryRepository>,
    Arc<MemoryAlerts>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = AssessmentService::new(
        catalog(),
        repository.clone(),
        alerts.clone(),
        scoring_config(),
    )
    .expect("fixture catalog validates");
    (service, repository, alerts)
}

pub(super) fn assessment_router_with_service(
    service: AssessmentService<MemoryRepository, MemoryAlerts>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl MemoryRepository {
    fn sorted_newest_first(records: Vec<AssessmentRecord>) -> Vec<AssessmentRecord> {
        let mut records = records;
        records.sort_by(|a, b| {
            (b.completed_at, &b.assessment_id.0).cmp(&(a.completed_at, &a.assessment_id.0))
        });
        records
    }
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.assessment_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.assessment_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_student(
        &self,
        student_id: &str,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let matching = guard
            .values()
            .filter(|record| record.student_id == student_id)
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching)
            .into_iter()
            .take(limit)
            .collect())
    }

    fn no_go(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let matching = guard
            .values()
            .filter(|record| {
                record.effective_decision()
                    == crate::workflows::preflight::assessments::FlightDecision::NoGo
            })
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching)
            .into_iter()
            .take(limit)
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<DispatchAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<DispatchAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: DispatchAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

pub(super) struct ConflictRepository;

impl AssessmentRepository for ConflictRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(None)
    }

    fn for_student(
        &self,
        _student_id: &str,
        _limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn no_go(&self, _limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_student(
        &self,
        _student_id: &str,
        _limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn no_go(&self, _limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
