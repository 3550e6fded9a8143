use serde::{Deserialize, Serialize};

/// Scoring thresholds applied when classifying a completed assessment.
///
/// `caution_threshold` is an explicit business input, not a formula: scores
/// in `caution_threshold..=max_allowed_score` classify as CAUTION.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub max_allowed_score: u32,
    pub caution_threshold: u32,
}

impl ScoringConfig {
    pub fn new(max_allowed_score: u32, caution_threshold: u32) -> Self {
        Self {
            max_allowed_score,
            caution_threshold,
        }
    }

    /// Threshold at three quarters of the maximum, the historical default
    /// used by flight-school operations when no explicit band is configured.
    pub fn with_default_caution(max_allowed_score: u32) -> Self {
        Self {
            max_allowed_score,
            caution_threshold: max_allowed_score.saturating_mul(3) / 4,
        }
    }

    pub fn in_caution_band(&self, total_score: u32) -> bool {
        total_score >= self.caution_threshold && total_score <= self.max_allowed_score
    }
}
