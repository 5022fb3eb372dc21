use serde::{Deserialize, Serialize};

use crate::config::{ScoringConfig, DEFAULT_REFER_THRESHOLD};

/// Threshold applied to classifier probabilities: strictly above refers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub refer_threshold: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            refer_threshold: DEFAULT_REFER_THRESHOLD,
        }
    }
}

impl From<&ScoringConfig> for DecisionConfig {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            refer_threshold: config.refer_threshold,
        }
    }
}
