use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Grouping of related questions, ordered for presentation and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: u32,
}

/// A single questionnaire entry together with its scoring rubric.
///
/// The question-level `is_disqualifying` flag only advertises that some
/// answer can force a NO-GO; the actual condition lives on the option or
/// range that carries the flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category_id: String,
    pub question_text: String,
    pub is_disqualifying: bool,
    pub help_text: Option<String>,
    pub is_active: bool,
    pub display_order: u32,
    pub scoring: QuestionScoring,
}

/// Scoring shape of a question: a fixed option set or numeric ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum QuestionScoring {
    MultipleChoice { options: Vec<AnswerOption> },
    Numeric { ranges: Vec<NumericRange> },
}

/// Selectable answer for a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub answer_text: String,
    pub risk_score: u32,
    pub is_disqualifying: bool,
    pub display_order: u32,
}

/// Scoring band for a numeric question. `None` bounds are unbounded and
/// both bounds are inclusive when matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub id: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub risk_score: u32,
    pub is_disqualifying: bool,
    pub range_label: Option<String>,
}

impl NumericRange {
    pub(crate) fn lower_bound(&self) -> f64 {
        self.min_value.unwrap_or(f64::NEG_INFINITY)
    }

    pub(crate) fn upper_bound(&self) -> f64 {
        self.max_value.unwrap_or(f64::INFINITY)
    }

    /// Human-readable label, falling back to the numeric bounds.
    pub fn describe(&self) -> String {
        match &self.range_label {
            Some(label) => label.clone(),
            None => {
                let lower = self
                    .min_value
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "-inf".to_string());
                let upper = self
                    .max_value
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "+inf".to_string());
                format!("{lower}..{upper}")
            }
        }
    }
}

/// Read-only snapshot of the scoring catalog used for one evaluation.
///
/// The evaluator never mutates or re-fetches the snapshot; callers decide
/// how fresh a snapshot has to be before handing it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCatalog {
    pub categories: Vec<Category>,
    pub questions: Vec<Question>,
}

impl RiskCatalog {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.id == category_id)
    }

    /// Questions that participate in new assessments, in presentation order.
    pub fn active_questions(&self) -> Vec<&Question> {
        let mut active: Vec<&Question> = self
            .questions
            .iter()
            .filter(|question| question.is_active)
            .collect();
        active.sort_by_key(|question| {
            let category_order = self
                .category(&question.category_id)
                .map(|category| category.display_order)
                .unwrap_or(u32::MAX);
            (category_order, question.display_order)
        });
        active
    }

    /// Enforce the invariants the evaluator depends on before a catalog is
    /// published. Collects every violation instead of stopping at the first
    /// so an editor can report them all at once.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut violations = Vec::new();
        let mut seen_questions = BTreeSet::new();

        for question in &self.questions {
            if !seen_questions.insert(question.id.as_str()) {
                violations.push(CatalogViolation::DuplicateQuestion {
                    question_id: question.id.clone(),
                });
            }

            if self.category(&question.category_id).is_none() {
                violations.push(CatalogViolation::UnknownCategory {
                    question_id: question.id.clone(),
                    category_id: question.category_id.clone(),
                });
            }

            match &question.scoring {
                QuestionScoring::MultipleChoice { options } => {
                    validate_options(question, options, &mut violations);
                }
                QuestionScoring::Numeric { ranges } => {
                    validate_ranges(question, ranges, &mut violations);
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CatalogError { violations })
        }
    }

    /// Presentation view of the active catalog, grouped by category.
    pub fn active_view(&self) -> CatalogView {
        let mut categories: Vec<&Category> = self.categories.iter().collect();
        categories.sort_by_key(|category| category.display_order);

        let views = categories
            .into_iter()
            .map(|category| {
                let mut questions: Vec<&Question> = self
                    .questions
                    .iter()
                    .filter(|question| {
                        question.is_active && question.category_id == category.id
                    })
                    .collect();
                questions.sort_by_key(|question| question.display_order);

                CategoryView {
                    id: category.id.clone(),
                    name: category.name.clone(),
                    description: category.description.clone(),
                    questions: questions.into_iter().cloned().collect(),
                }
            })
            .filter(|view| !view.questions.is_empty())
            .collect();

        CatalogView { categories: views }
    }
}

fn validate_options(
    question: &Question,
    options: &[AnswerOption],
    violations: &mut Vec<CatalogViolation>,
) {
    if options.is_empty() {
        violations.push(CatalogViolation::EmptyOptions {
            question_id: question.id.clone(),
        });
        return;
    }

    if question.is_disqualifying && !options.iter().any(|option| option.is_disqualifying) {
        violations.push(CatalogViolation::MissingDisqualifier {
            question_id: question.id.clone(),
        });
    }
}

fn validate_ranges(
    question: &Question,
    ranges: &[NumericRange],
    violations: &mut Vec<CatalogViolation>,
) {
    if ranges.is_empty() {
        violations.push(CatalogViolation::EmptyRanges {
            question_id: question.id.clone(),
        });
        return;
    }

    for range in ranges {
        let finite_bounds = range.min_value.map_or(true, f64::is_finite)
            && range.max_value.map_or(true, f64::is_finite);
        if !finite_bounds {
            violations.push(CatalogViolation::NonFiniteBound {
                question_id: question.id.clone(),
                range: range.describe(),
            });
            return;
        }

        if range.lower_bound() > range.upper_bound() {
            violations.push(CatalogViolation::InvertedRange {
                question_id: question.id.clone(),
                range: range.describe(),
            });
        }
    }

    let ordered = ranges_in_bound_order(ranges);
    for pair in ordered.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        if next.lower_bound() < previous.upper_bound() {
            violations.push(CatalogViolation::OverlappingRanges {
                question_id: question.id.clone(),
                first: previous.describe(),
                second: next.describe(),
            });
        } else if next.lower_bound() > previous.upper_bound() {
            violations.push(CatalogViolation::CoverageGap {
                question_id: question.id.clone(),
                below: previous.describe(),
                above: next.describe(),
            });
        }
    }

    if question.is_disqualifying && !ranges.iter().any(|range| range.is_disqualifying) {
        violations.push(CatalogViolation::MissingDisqualifier {
            question_id: question.id.clone(),
        });
    }
}

/// Ranges sorted ascending by lower bound, unbounded lows first.
pub(crate) fn ranges_in_bound_order(ranges: &[NumericRange]) -> Vec<&NumericRange> {
    let mut ordered: Vec<&NumericRange> = ranges.iter().collect();
    ordered.sort_by(|a, b| {
        a.lower_bound()
            .partial_cmp(&b.lower_bound())
            .unwrap_or(Ordering::Equal)
            .then(
                a.upper_bound()
                    .partial_cmp(&b.upper_bound())
                    .unwrap_or(Ordering::Equal),
            )
    });
    ordered
}

/// Resolve a numeric value to the first matching range in ascending bound
/// order. Shared by the scorer and the catalog validation so the two can
/// never drift on what counts as scorable.
pub fn match_range<'a>(ranges: &'a [NumericRange], value: f64) -> Option<&'a NumericRange> {
    ranges_in_bound_order(ranges)
        .into_iter()
        .find(|range| value >= range.lower_bound() && value <= range.upper_bound())
}

/// Validation errors raised when a catalog snapshot is published.
#[derive(Debug, thiserror::Error)]
#[error("catalog failed validation with {} violation(s)", violations.len())]
pub struct CatalogError {
    pub violations: Vec<CatalogViolation>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogViolation {
    #[error("duplicate question id {question_id}")]
    DuplicateQuestion { question_id: String },
    #[error("question {question_id} references unknown category {category_id}")]
    UnknownCategory {
        question_id: String,
        category_id: String,
    },
    #[error("multiple-choice question {question_id} has no answer options")]
    EmptyOptions { question_id: String },
    #[error("numeric question {question_id} has no scoring ranges")]
    EmptyRanges { question_id: String },
    #[error("question {question_id} range '{range}' has a non-finite bound")]
    NonFiniteBound { question_id: String, range: String },
    #[error("question {question_id} range '{range}' has min above max")]
    InvertedRange { question_id: String, range: String },
    #[error("question {question_id} ranges '{first}' and '{second}' overlap")]
    OverlappingRanges {
        question_id: String,
        first: String,
        second: String,
    },
    #[error("question {question_id} leaves a gap between '{below}' and '{above}'")]
    CoverageGap {
        question_id: String,
        below: String,
        above: String,
    },
    #[error("question {question_id} is marked disqualifying but no answer carries the flag")]
    MissingDisqualifier { question_id: String },
}

/// Active catalog grouped for questionnaire rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogView {
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
}
