use std::sync::Arc;

use super::common::*;
use crate::workflows::preflight::assessments::domain::AssessmentId;
use crate::workflows::preflight::assessments::{
    AssessmentRepository, AssessmentService, AssessmentServiceError, EvaluationError,
    FlightDecision,
};

#[test]
fn submit_evaluates_and_stores_the_record() {
    let (service, repository, _) = build_service();

    let record = service
        .submit(submission(clean_responses()))
        .expect("submission succeeds");

    assert!(record.assessment_id.0.starts_with("asmt-"));
    assert_eq!(record.outcome.decision, FlightDecision::Go);
    assert_eq!(record.outcome.total_score, 0);
    assert_eq!(record.student_id, "stu-001");

    let stored = repository
        .fetch(&record.assessment_id)
        .expect("repo fetch")
        .expect("record present");
    assert_eq!(stored.outcome, record.outcome);
}

#[test]
fn no_go_submissions_alert_dispatch() {
    let (service, _, alerts) = build_service();

    let record = service
        .submit(submission(disqualified_responses()))
        .expect("submission succeeds");

    assert_eq!(record.outcome.decision, FlightDecision::NoGo);

    let events = alerts.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, "assessment_no_go");
    assert_eq!(events[0].assessment_id, record.assessment_id);
    assert_eq!(
        events[0].details.get("student_id").map(String::as_str),
        Some("stu-001")
    );
}

#[test]
fn go_submissions_stay_quiet() {
    let (service, _, alerts) = build_service();

    service
        .submit(submission(clean_responses()))
        .expect("submission succeeds");

    assert!(alerts.events().is_empty());
}

#[test]
fn incomplete_submissions_are_rejected_whole() {
    let (service, repository, _) = build_service();
    let mut responses = clean_responses();
    responses.truncate(2);

    match service.submit(submission(responses)) {
        Err(AssessmentServiceError::Evaluation(EvaluationError::Validation(error))) => {
            assert!(!error.issues.is_empty());
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
}

#[test]
fn instructors_can_override_with_a_reason() {
    let (service, _, _) = build_service();

    let record = service
        .submit(submission(disqualified_responses()))
        .expect("submission succeeds");
    assert_eq!(record.effective_decision(), FlightDecision::NoGo);

    let updated = service
        .override_decision(
            &record.assessment_id,
            "instr-007",
            "Verified with the student; symptoms resolved and documented.",
            FlightDecision::Go,
        )
        .expect("override succeeds");

    assert_eq!(updated.effective_decision(), FlightDecision::Go);
    assert_eq!(updated.outcome.decision, FlightDecision::NoGo);
    let view = updated.result_view();
    assert!(view.overridden);
    assert_eq!(view.result, "go");
}

#[test]
fn overrides_require_a_reason() {
    let (service, _, _) = build_service();

    let record = service
        .submit(submission(clean_responses()))
        .expect("submission succeeds");

    match service.override_decision(&record.assessment_id, "instr-007", "  ", FlightDecision::NoGo)
    {
        Err(AssessmentServiceError::MissingOverrideReason) => {}
        other => panic!("expected missing reason error, got {other:?}"),
    }
}

#[test]
fn override_of_unknown_assessment_is_not_found() {
    let (service, _, _) = build_service();

    match service.override_decision(
        &AssessmentId("asmt-does-not-exist".to_string()),
        "instr-007",
        "reason",
        FlightDecision::Go,
    ) {
        Err(AssessmentServiceError::Repository(
            crate::workflows::preflight::assessments::RepositoryError::NotFound,
        )) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn student_history_is_newest_first_and_limited() {
    let (service, _, _) = build_service();

    let first = service
        .submit(submission(clean_responses()))
        .expect("first submission");
    let second = service
        .submit(submission(clean_responses()))
        .expect("second submission");
    let third = service
        .submit(submission(disqualified_responses()))
        .expect("third submission");

    let history = service
        .student_history("stu-001", 2)
        .expect("history loads");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].assessment_id, third.assessment_id);
    assert_eq!(history[1].assessment_id, second.assessment_id);

    let full = service
        .student_history("stu-001", 10)
        .expect("history loads");
    assert_eq!(full.len(), 3);
    assert_eq!(full[2].assessment_id, first.assessment_id);
}

#[test]
fn no_go_listing_only_contains_no_go_verdicts() {
    let (service, _, _) = build_service();

    service
        .submit(submission(clean_responses()))
        .expect("go submission");
    let flagged = service
        .submit(submission(disqualified_responses()))
        .expect("no-go submission");

    let listed = service.no_go_assessments(10).expect("listing loads");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].assessment_id, flagged.assessment_id);
}

#[test]
fn service_construction_rejects_broken_catalogs() {
    let mut bad = catalog();
    bad.questions.push(numeric_question(
        "q-overlap",
        "cat-pilot",
        "Overlapping bands",
        vec![
            range("r-a", Some(0.0), Some(15.0), 0, false),
            range("r-b", Some(10.0), Some(20.0), 5, false),
        ],
    ));

    let result = AssessmentService::new(
        bad,
        Arc::new(MemoryRepository::default()),
        Arc::new(MemoryAlerts::default()),
        scoring_config(),
    );

    assert!(result.is_err());
}
