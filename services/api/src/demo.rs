use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use flightline::config::AppConfig;
use flightline::error::AppError;
use flightline::workflows::preflight::assessments::{
    AssessmentServiceError, AssessmentSubmission, EvaluationEngine, EvaluationError,
    FlightDecision, QuestionResponse, ScoringConfig,
};
use flightline::workflows::preflight::catalog::RiskCatalog;

use crate::infra::{default_catalog, InMemoryAlertPublisher, InMemoryAssessmentRepository};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Path to a catalog snapshot (JSON)
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Path to the submitted responses (JSON array)
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Override the maximum allowed score
    #[arg(long)]
    pub(crate) max_score: Option<u32>,
    /// Override the caution threshold
    #[arg(long)]
    pub(crate) caution_threshold: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print per-question score contributions for each scenario
    #[arg(long)]
    pub(crate) list_scores: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        catalog,
        responses,
        max_score,
        caution_threshold,
    } = args;

    let catalog: RiskCatalog = serde_json::from_str(&std::fs::read_to_string(catalog)?)?;
    let responses: Vec<QuestionResponse> =
        serde_json::from_str(&std::fs::read_to_string(responses)?)?;

    catalog.validate()?;

    let mut scoring = match max_score {
        Some(max) => ScoringConfig::with_default_caution(max),
        None => AppConfig::load()?.scoring,
    };
    if let Some(threshold) = caution_threshold {
        scoring.caution_threshold = threshold;
    }

    let engine = EvaluationEngine::new(scoring);
    let outcome = match engine.evaluate(&catalog, &responses) {
        Ok(outcome) => outcome,
        Err(EvaluationError::Validation(error)) => {
            println!("Responses failed validation:");
            for issue in &error.issues {
                println!("- {}: {:?}", issue.question_id, issue.reason);
            }
            return Err(AssessmentServiceError::from(EvaluationError::Validation(error)).into());
        }
        Err(error) => return Err(AssessmentServiceError::from(error).into()),
    };

    println!(
        "Verdict: {} (score {}/{})",
        outcome.decision.label(),
        outcome.total_score,
        outcome.max_allowed_score
    );
    println!("{}", outcome.message);
    println!("\nPer-question scores");
    for score in &outcome.scores {
        println!(
            "- {}: {} ({})",
            score.question_id, score.risk_score, score.notes
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { list_scores } = args;

    println!("Preflight assessment demo");

    let repository = Arc::new(InMemoryAssessmentRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let service = flightline::workflows::preflight::assessments::AssessmentService::new(
        default_catalog(),
        repository,
        alerts.clone(),
        demo_scoring(),
    )?;

    let scenarios = [
        ("Rested pilot, clear day", rested_responses()),
        ("Long duty day, marginal weather", stretched_responses()),
        ("Impairing symptoms reported", impaired_responses()),
    ];

    let mut flagged_id = None;
    for (label, responses) in scenarios {
        println!("\nScenario: {label}");
        let record = match service.submit(demo_submission(responses)) {
            Ok(record) => record,
            Err(err) => {
                println!("  Submission rejected: {err}");
                continue;
            }
        };

        let view = record.result_view();
        println!(
            "  {} -> {} (score {}/{})",
            view.assessment_id.0, view.result, view.total_score, view.max_allowed_score
        );
        println!("  {}", view.message);

        if list_scores {
            for score in &record.outcome.scores {
                println!("    - {}: {} ({})", score.question_id, score.risk_score, score.notes);
            }
        }

        if record.outcome.decision == FlightDecision::NoGo {
            flagged_id = Some(record.assessment_id.clone());
        }
    }

    println!("\nIncomplete submission demo");
    match service.submit(demo_submission(vec![QuestionResponse::numeric("q-sleep", 8.0)])) {
        Err(AssessmentServiceError::Evaluation(EvaluationError::Validation(error))) => {
            println!("  Rejected as expected with {} issue(s):", error.issues.len());
            for issue in error.issues.iter().take(3) {
                println!("    - {}: {:?}", issue.question_id, issue.reason);
            }
        }
        Ok(_) => println!("  Unexpectedly accepted"),
        Err(err) => println!("  Rejected with unexpected error: {err}"),
    }

    if let Some(assessment_id) = flagged_id {
        println!("\nInstructor review demo");
        let updated = service.override_decision(
            &assessment_id,
            "instr-001",
            "Discussed with student; symptoms cleared and documented.",
            FlightDecision::Go,
        )?;
        println!(
            "  {} overridden to {} (engine verdict {} kept on record)",
            updated.assessment_id.0,
            updated.effective_decision().label(),
            updated.outcome.decision.label()
        );

        match serde_json::to_string_pretty(&updated.result_view()) {
            Ok(json) => println!("  Public result payload:\n{json}"),
            Err(err) => println!("  Public result payload unavailable: {err}"),
        }
    }

    let events = alerts.events();
    if events.is_empty() {
        println!("\nDispatch alerts: none");
    } else {
        println!("\nDispatch alerts");
        for alert in events {
            println!("  - template={} -> {}", alert.template, alert.assessment_id.0);
        }
    }

    Ok(())
}

pub(crate) fn demo_scoring() -> ScoringConfig {
    ScoringConfig::new(20, 15)
}

fn demo_submission(responses: Vec<QuestionResponse>) -> AssessmentSubmission {
    AssessmentSubmission {
        student_id: "stu-demo".to_string(),
        flight_session_id: Some("session-demo".to_string()),
        responses,
        notes: Some("CLI demo".to_string()),
    }
}

/// Zero-risk answers across the seeded catalog.
pub(crate) fn rested_responses() -> Vec<QuestionResponse> {
    vec![
        QuestionResponse::numeric("q-sleep", 8.0),
        QuestionResponse::numeric("q-duty", 4.0),
        QuestionResponse::choice("q-currency", "opt-currency-high"),
        QuestionResponse::choice("q-health", "opt-health-none"),
        QuestionResponse::choice("q-squawks", "opt-squawk-none"),
        QuestionResponse::choice("q-fuel", "opt-fuel-ample"),
        QuestionResponse::numeric("q-ceiling", 4500.0),
        QuestionResponse::choice("q-wind", "opt-wind-calm"),
    ]
}

/// Accumulated moderate risk: lands inside the caution band.
pub(crate) fn stretched_responses() -> Vec<QuestionResponse> {
    vec![
        QuestionResponse::numeric("q-sleep", 5.0),
        QuestionResponse::numeric("q-duty", 9.0),
        QuestionResponse::choice("q-currency", "opt-currency-mid"),
        QuestionResponse::choice("q-health", "opt-health-none"),
        QuestionResponse::choice("q-squawks", "opt-squawk-deferred"),
        QuestionResponse::choice("q-fuel", "opt-fuel-ample"),
        QuestionResponse::numeric("q-ceiling", 2000.0),
        QuestionResponse::choice("q-wind", "opt-wind-moderate"),
    ]
}

/// Low score but disqualifying: the verdict must still be NO-GO.
pub(crate) fn impaired_responses() -> Vec<QuestionResponse> {
    vec![
        QuestionResponse::numeric("q-sleep", 8.0),
        QuestionResponse::numeric("q-duty", 4.0),
        QuestionResponse::choice("q-currency", "opt-currency-high"),
        QuestionResponse::choice("q-health", "opt-health-impairing"),
        QuestionResponse::choice("q-squawks", "opt-squawk-none"),
        QuestionResponse::choice("q-fuel", "opt-fuel-ample"),
        QuestionResponse::numeric("q-ceiling", 4500.0),
        QuestionResponse::choice("q-wind", "opt-wind-calm"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rested_scenario_is_a_clean_go() {
        let engine = EvaluationEngine::new(demo_scoring());
        let outcome = engine
            .evaluate(&default_catalog(), &rested_responses())
            .expect("evaluates");
        assert_eq!(outcome.decision, FlightDecision::Go);
        assert_eq!(outcome.total_score, 0);
    }

    #[test]
    fn stretched_scenario_lands_in_the_caution_band() {
        let engine = EvaluationEngine::new(demo_scoring());
        let outcome = engine
            .evaluate(&default_catalog(), &stretched_responses())
            .expect("evaluates");
        assert_eq!(outcome.decision, FlightDecision::Caution);
        assert_eq!(outcome.total_score, 16);
    }

    #[test]
    fn impaired_scenario_is_a_no_go_despite_zero_score() {
        let engine = EvaluationEngine::new(demo_scoring());
        let outcome = engine
            .evaluate(&default_catalog(), &impaired_responses())
            .expect("evaluates");
        assert_eq!(outcome.decision, FlightDecision::NoGo);
        assert_eq!(outcome.total_score, 0);
        assert!(outcome.has_disqualifying_answers);
    }
}
