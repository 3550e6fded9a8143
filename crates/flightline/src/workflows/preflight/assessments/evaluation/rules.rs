use super::super::super::catalog::{match_range, Question, QuestionScoring, RiskCatalog};
use super::super::domain::QuestionResponse;
use super::super::validation::{ResponseIssue, ResponseIssueReason, ValidationError};
use super::{EvaluationError, QuestionScore};

/// Signals the classifier consumes beyond the raw total.
pub(crate) struct ScoreSignals {
    pub disqualifier: Option<Disqualifier>,
}

/// First disqualifying answer encountered, kept for the verdict message.
pub(crate) struct Disqualifier {
    pub category_name: String,
    pub answer_label: String,
}

/// Resolve every validated response to its risk score and disqualification
/// flag, accumulating the total and the per-question audit trail.
pub(crate) fn score_responses(
    catalog: &RiskCatalog,
    responses: &[QuestionResponse],
) -> Result<(Vec<QuestionScore>, u32, ScoreSignals), EvaluationError> {
    let mut scores = Vec::with_capacity(responses.len());
    let mut total_score: u32 = 0;
    let mut disqualifier: Option<Disqualifier> = None;

    for response in responses {
        let question = catalog.question(&response.question_id).ok_or_else(|| {
            ValidationError {
                issues: vec![ResponseIssue {
                    question_id: response.question_id.clone(),
                    reason: ResponseIssueReason::UnknownQuestion,
                }],
            }
        })?;

        let (risk_score, is_disqualifying, answer_label) = resolve(question, response)?;

        total_score += risk_score;
        if is_disqualifying && disqualifier.is_none() {
            disqualifier = Some(Disqualifier {
                category_name: catalog
                    .category(&question.category_id)
                    .map(|category| category.name.clone())
                    .unwrap_or_else(|| question.category_id.clone()),
                answer_label: answer_label.clone(),
            });
        }

        scores.push(QuestionScore {
            question_id: question.id.clone(),
            category_id: question.category_id.clone(),
            risk_score,
            is_disqualifying,
            notes: format!("{answer_label} scored {risk_score}"),
        });
    }

    Ok((scores, total_score, ScoreSignals { disqualifier }))
}

/// Resolve one response against its question's rubric.
///
/// Option ids are re-checked here even though the validator already did:
/// a stale client can still reference an option edited out from under it,
/// and that must surface as a hard failure rather than a zero score.
fn resolve(
    question: &Question,
    response: &QuestionResponse,
) -> Result<(u32, bool, String), EvaluationError> {
    match &question.scoring {
        QuestionScoring::MultipleChoice { options } => {
            let option_id = response.answer_option_id.as_deref().unwrap_or_default();
            let option = options
                .iter()
                .find(|option| option.id == option_id)
                .ok_or_else(|| EvaluationError::UnknownOption {
                    question_id: question.id.clone(),
                    option_id: option_id.to_string(),
                })?;
            Ok((
                option.risk_score,
                option.is_disqualifying,
                format!("answer '{}'", option.answer_text),
            ))
        }
        QuestionScoring::Numeric { ranges } => {
            let value = response.numeric_value.unwrap_or(f64::NAN);
            let range = match_range(ranges, value).ok_or_else(|| {
                EvaluationError::UnscorableValue {
                    question_id: question.id.clone(),
                    value,
                }
            })?;
            Ok((
                range.risk_score,
                range.is_disqualifying,
                format!("value {} in band '{}'", value, range.describe()),
            ))
        }
    }
}
