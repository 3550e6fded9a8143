//! Preflight risk workflows: the scoring catalog and assessment pipeline.

pub mod assessments;
pub mod catalog;

pub use catalog::{
    match_range, AnswerOption, CatalogError, CatalogView, CatalogViolation, Category,
    CategoryView, NumericRange, Question, QuestionScoring, RiskCatalog,
};
