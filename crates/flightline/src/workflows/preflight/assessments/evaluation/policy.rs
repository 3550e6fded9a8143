use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use super::rules::ScoreSignals;

/// Three-way flight-safety verdict for a completed assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightDecision {
    Go,
    Caution,
    NoGo,
}

impl FlightDecision {
    pub const fn label(self) -> &'static str {
        match self {
            FlightDecision::Go => "go",
            FlightDecision::Caution => "caution",
            FlightDecision::NoGo => "no_go",
        }
    }
}

/// Classify a fully resolved assessment. Disqualification always wins,
/// then the hard ceiling, then the configured caution band.
pub(crate) fn decide_outcome(
    total_score: u32,
    config: &ScoringConfig,
    signals: &ScoreSignals,
) -> FlightDecision {
    if signals.disqualifier.is_some() {
        return FlightDecision::NoGo;
    }

    if total_score > config.max_allowed_score {
        return FlightDecision::NoGo;
    }

    if config.in_caution_band(total_score) {
        return FlightDecision::Caution;
    }

    FlightDecision::Go
}

/// Deterministic explanation for a verdict. Same inputs, same text.
pub(crate) fn outcome_message(
    decision: FlightDecision,
    total_score: u32,
    config: &ScoringConfig,
    signals: &ScoreSignals,
) -> String {
    if let Some(disqualifier) = &signals.disqualifier {
        return format!(
            "NO-GO: disqualifying condition in {} ({}). Do not fly today.",
            disqualifier.category_name, disqualifier.answer_label
        );
    }

    match decision {
        FlightDecision::NoGo => format!(
            "NO-GO: risk score {} exceeds the maximum allowed {}. Postpone this flight.",
            total_score, config.max_allowed_score
        ),
        FlightDecision::Caution => format!(
            "CAUTION: risk score {} is approaching the limit of {}. Review your answers and \
             consider mitigation strategies or an instructor consultation before flying.",
            total_score, config.max_allowed_score
        ),
        FlightDecision::Go => format!(
            "GO: risk score {} is within acceptable limits (max {}). Safe flying.",
            total_score, config.max_allowed_score
        ),
    }
}
