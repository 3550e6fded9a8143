use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::super::catalog::{QuestionScoring, RiskCatalog};
use super::domain::QuestionResponse;

/// Why a single response (or its absence) failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseIssueReason {
    /// An active question received no response.
    Unanswered,
    /// More than one response targeted the same question.
    Duplicate,
    /// The response names a question the catalog does not contain.
    UnknownQuestion,
    /// The response targets a question retired from new assessments.
    InactiveQuestion,
    /// A multiple-choice question needs an `answer_option_id`.
    ExpectedAnswerOption,
    /// A numeric question needs a `numeric_value`.
    ExpectedNumericValue,
    /// The named option does not belong to the question.
    UnknownAnswerOption,
    /// The numeric value was NaN or infinite.
    NonFiniteValue,
    /// Both an option and a numeric value were supplied.
    AmbiguousResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseIssue {
    pub question_id: String,
    pub reason: ResponseIssueReason,
}

/// Raised when a response set is incomplete or malformed. Carries every
/// issue found so the submitter can fix the whole form in one pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("assessment responses failed validation with {} issue(s)", issues.len())]
pub struct ValidationError {
    pub issues: Vec<ResponseIssue>,
}

/// The single authoritative completeness and shape check. Every caller of
/// the engine (HTTP form, CLI, tests) goes through here; nothing is scored
/// until the full set passes.
pub fn validate_responses(
    catalog: &RiskCatalog,
    responses: &[QuestionResponse],
) -> Result<(), ValidationError> {
    let questions: BTreeMap<&str, _> = catalog
        .questions
        .iter()
        .map(|question| (question.id.as_str(), question))
        .collect();

    let mut issues = Vec::new();
    let mut answered = BTreeSet::new();

    for response in responses {
        let question = match questions.get(response.question_id.as_str()) {
            Some(question) => *question,
            None => {
                issues.push(ResponseIssue {
                    question_id: response.question_id.clone(),
                    reason: ResponseIssueReason::UnknownQuestion,
                });
                continue;
            }
        };

        if !question.is_active {
            issues.push(ResponseIssue {
                question_id: response.question_id.clone(),
                reason: ResponseIssueReason::InactiveQuestion,
            });
            continue;
        }

        if !answered.insert(response.question_id.as_str()) {
            issues.push(ResponseIssue {
                question_id: response.question_id.clone(),
                reason: ResponseIssueReason::Duplicate,
            });
            continue;
        }

        if response.answer_option_id.is_some() && response.numeric_value.is_some() {
            issues.push(ResponseIssue {
                question_id: response.question_id.clone(),
                reason: ResponseIssueReason::AmbiguousResponse,
            });
            continue;
        }

        match &question.scoring {
            QuestionScoring::MultipleChoice { options } => match &response.answer_option_id {
                Some(option_id) => {
                    if !options.iter().any(|option| option.id == *option_id) {
                        issues.push(ResponseIssue {
                            question_id: response.question_id.clone(),
                            reason: ResponseIssueReason::UnknownAnswerOption,
                        });
                    }
                }
                None => {
                    issues.push(ResponseIssue {
                        question_id: response.question_id.clone(),
                        reason: ResponseIssueReason::ExpectedAnswerOption,
                    });
                }
            },
            QuestionScoring::Numeric { .. } => match response.numeric_value {
                Some(value) if value.is_finite() => {}
                Some(_) => {
                    issues.push(ResponseIssue {
                        question_id: response.question_id.clone(),
                        reason: ResponseIssueReason::NonFiniteValue,
                    });
                }
                None => {
                    issues.push(ResponseIssue {
                        question_id: response.question_id.clone(),
                        reason: ResponseIssueReason::ExpectedNumericValue,
                    });
                }
            },
        }
    }

    for question in catalog.active_questions() {
        if !answered.contains(question.id.as_str()) {
            issues.push(ResponseIssue {
                question_id: question.id.clone(),
                reason: ResponseIssueReason::Unanswered,
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}
