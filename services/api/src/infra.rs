use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;

use flightline::workflows::preflight::assessments::{
    AlertError, AlertPublisher, AssessmentId, AssessmentRecord, AssessmentRepository,
    DispatchAlert, FlightDecision, RepositoryError,
};
use flightline::workflows::preflight::catalog::{
    AnswerOption, Category, NumericRange, Question, QuestionScoring, RiskCatalog,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl InMemoryAssessmentRepository {
    fn newest_first(mut records: Vec<AssessmentRecord>, limit: usize) -> Vec<AssessmentRecord> {
        records.sort_by(|a, b| {
            (b.completed_at, &b.assessment_id.0).cmp(&(a.completed_at, &a.assessment_id.0))
        });
        records.truncate(limit);
        records
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
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
        if guard.contains_key(&record.assessment_id) {
            guard.insert(record.assessment_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
        Ok(Self::newest_first(matching, limit))
    }

    fn no_go(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let matching = guard
            .values()
            .filter(|record| record.effective_decision() == FlightDecision::NoGo)
            .cloned()
            .collect();
        Ok(Self::newest_first(matching, limit))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<DispatchAlert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: DispatchAlert) -> Result<(), AlertError> {
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<DispatchAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

fn category(id: &str, name: &str, description: &str, order: u32) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        display_order: order,
    }
}

fn choice(
    id: &str,
    category_id: &str,
    order: u32,
    text: &str,
    help: Option<&str>,
    options: Vec<AnswerOption>,
) -> Question {
    let is_disqualifying = options.iter().any(|option| option.is_disqualifying);
    Question {
        id: id.to_string(),
        category_id: category_id.to_string(),
        question_text: text.to_string(),
        is_disqualifying,
        help_text: help.map(str::to_string),
        is_active: true,
        display_order: order,
        scoring: QuestionScoring::MultipleChoice { options },
    }
}

fn numeric(
    id: &str,
    category_id: &str,
    order: u32,
    text: &str,
    help: Option<&str>,
    ranges: Vec<NumericRange>,
) -> Question {
    let is_disqualifying = ranges.iter().any(|range| range.is_disqualifying);
    Question {
        id: id.to_string(),
        category_id: category_id.to_string(),
        question_text: text.to_string(),
        is_disqualifying,
        help_text: help.map(str::to_string),
        is_active: true,
        display_order: order,
        scoring: QuestionScoring::Numeric { ranges },
    }
}

fn opt(id: &str, text: &str, score: u32, disqualifying: bool, order: u32) -> AnswerOption {
    AnswerOption {
        id: id.to_string(),
        answer_text: text.to_string(),
        risk_score: score,
        is_disqualifying: disqualifying,
        display_order: order,
    }
}

fn band(
    id: &str,
    min: Option<f64>,
    max: Option<f64>,
    score: u32,
    disqualifying: bool,
    label: &str,
) -> NumericRange {
    NumericRange {
        id: id.to_string(),
        min_value: min,
        max_value: max,
        risk_score: score,
        is_disqualifying: disqualifying,
        range_label: Some(label.to_string()),
    }
}

/// Seeded flight-school catalog used by `serve` and `demo`. A deployment
/// would load this snapshot from the school's configuration store instead.
pub(crate) fn default_catalog() -> RiskCatalog {
    RiskCatalog {
        categories: vec![
            category("cat-pilot", "Pilot", "Pilot readiness and recency", 1),
            category("cat-aircraft", "Aircraft", "Airworthiness and fuel", 2),
            category("cat-environment", "Environment", "Weather along the route", 3),
        ],
        questions: vec![
            numeric(
                "q-sleep",
                "cat-pilot",
                1,
                "How many hours of sleep did you get in the last 24 hours?",
                Some("Count actual sleep, not time in bed"),
                vec![
                    band("r-sleep-short", None, Some(4.0), 8, false, "Under four hours"),
                    band("r-sleep-fair", Some(4.0), Some(6.0), 4, false, "Four to six hours"),
                    band("r-sleep-rested", Some(6.0), None, 0, false, "Rested"),
                ],
            ),
            numeric(
                "q-duty",
                "cat-pilot",
                2,
                "How many hours will you have been on duty at engine start?",
                None,
                vec![
                    band("r-duty-fresh", None, Some(8.0), 0, false, "Fresh"),
                    band("r-duty-long", Some(8.0), Some(12.0), 3, false, "Long day"),
                    band("r-duty-extended", Some(12.0), None, 6, false, "Extended duty"),
                ],
            ),
            choice(
                "q-currency",
                "cat-pilot",
                3,
                "Flight time in type during the last 90 days",
                None,
                vec![
                    opt("opt-currency-high", "More than 10 hours", 0, false, 1),
                    opt("opt-currency-mid", "2 to 10 hours", 2, false, 2),
                    opt("opt-currency-low", "Less than 2 hours", 4, false, 3),
                ],
            ),
            choice(
                "q-health",
                "cat-pilot",
                4,
                "Are you experiencing symptoms of illness or fatigue?",
                Some("Use the IMSAFE checklist"),
                vec![
                    opt("opt-health-none", "No symptoms", 0, false, 1),
                    opt("opt-health-minor", "Minor symptoms under control", 3, false, 2),
                    opt(
                        "opt-health-impairing",
                        "Symptoms affecting concentration",
                        0,
                        true,
                        3,
                    ),
                ],
            ),
            choice(
                "q-squawks",
                "cat-aircraft",
                1,
                "Open discrepancies on the aircraft?",
                None,
                vec![
                    opt("opt-squawk-none", "None", 0, false, 1),
                    opt(
                        "opt-squawk-deferred",
                        "Deferred, placarded items only",
                        2,
                        false,
                        2,
                    ),
                    opt(
                        "opt-squawk-open",
                        "Unresolved airworthiness item",
                        0,
                        true,
                        3,
                    ),
                ],
            ),
            choice(
                "q-fuel",
                "cat-aircraft",
                2,
                "Fuel reserve at planned destination",
                None,
                vec![
                    opt("opt-fuel-ample", "More than one hour", 0, false, 1),
                    opt("opt-fuel-legal", "30 to 60 minutes", 4, false, 2),
                    opt("opt-fuel-below", "Less than 30 minutes", 0, true, 3),
                ],
            ),
            numeric(
                "q-ceiling",
                "cat-environment",
                1,
                "Reported ceiling along the route (feet AGL)",
                None,
                vec![
                    band("r-ceiling-ifr", None, Some(500.0), 0, true, "Below VFR minimums"),
                    band(
                        "r-ceiling-marginal",
                        Some(500.0),
                        Some(1500.0),
                        5,
                        false,
                        "Marginal",
                    ),
                    band(
                        "r-ceiling-workable",
                        Some(1500.0),
                        Some(3000.0),
                        2,
                        false,
                        "Workable",
                    ),
                    band("r-ceiling-clear", Some(3000.0), None, 0, false, "Clear"),
                ],
            ),
            choice(
                "q-wind",
                "cat-environment",
                2,
                "Forecast surface wind at departure",
                None,
                vec![
                    opt("opt-wind-calm", "Below 10 knots", 0, false, 1),
                    opt("opt-wind-moderate", "10 to 20 knots", 3, false, 2),
                    opt("opt-wind-gusting", "Gusting above 20 knots", 5, false, 3),
                ],
            ),
        ],
    }
}
