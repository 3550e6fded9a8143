use serde::{Deserialize, Serialize};

/// Identifier wrapper for completed assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// One submitted answer. Exactly one of `answer_option_id` and
/// `numeric_value` is set, matching the question's scoring shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_option_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
}

impl QuestionResponse {
    pub fn choice(question_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer_option_id: Some(option_id.into()),
            numeric_value: None,
        }
    }

    pub fn numeric(question_id: impl Into<String>, value: f64) -> Self {
        Self {
            question_id: question_id.into(),
            answer_option_id: None,
            numeric_value: Some(value),
        }
    }
}

/// Inbound assessment submission gathered from a pilot before a flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_session_id: Option<String>,
    pub responses: Vec<QuestionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
