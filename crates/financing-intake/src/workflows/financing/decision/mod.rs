mod config;
mod policy;
mod rules;

pub use config::DecisionConfig;
pub use rules::OFFER_SALARY_MULTIPLE;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{ApplicationRequest, DecisionBasis, DecisionRecord};
use super::scoring::{FraudClassifier, RiskScorer, ScoringUnavailable};
use crate::config::ScoringConfig;
use policy::{build_record, outcome_for_probability};
use rules::parity_outcome;

/// Rule-path decision: odd salary refers, even salary passes with a `salary * 3` offer.
pub fn decide(request: &ApplicationRequest) -> DecisionRecord {
    let outcome = parity_outcome(request.salary());
    build_record(outcome, request.salary(), None, DecisionBasis::ParityRule)
}

/// Stateless decision maker. The classifier, when present, takes precedence over the parity rule.
pub struct DecisionEngine {
    config: DecisionConfig,
    scorer: Option<Arc<dyn RiskScorer>>,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self {
            config,
            scorer: None,
        }
    }

    pub fn with_scorer(config: DecisionConfig, scorer: Arc<dyn RiskScorer>) -> Self {
        Self {
            config,
            scorer: Some(scorer),
        }
    }

    /// Load the classifier named by `config`, staying on the parity rule if it is absent
    /// or unusable.
    pub fn from_config(config: &ScoringConfig) -> Self {
        let decision_config = DecisionConfig::from(config);

        let (Some(model_path), Some(reference_path)) =
            (&config.model_path, &config.reference_path)
        else {
            info!("no fraud classifier configured; deciding with the parity rule");
            return Self::new(decision_config);
        };

        match FraudClassifier::load(model_path, reference_path) {
            Ok(classifier) => {
                info!(
                    model = %classifier.model().name,
                    columns = classifier.schema().len(),
                    threshold = decision_config.refer_threshold,
                    "fraud classifier loaded"
                );
                Self::with_scorer(decision_config, Arc::new(classifier))
            }
            Err(err) => {
                warn!(error = %err, "fraud classifier unavailable; deciding with the parity rule");
                Self::new(decision_config)
            }
        }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn status(&self) -> ScoringStatus {
        match &self.scorer {
            Some(scorer) => ScoringStatus {
                mode: ScoringMode::Model,
                model: Some(scorer.name().to_string()),
                threshold: self.config.refer_threshold,
            },
            None => ScoringStatus {
                mode: ScoringMode::ParityRule,
                model: None,
                threshold: self.config.refer_threshold,
            },
        }
    }

    pub fn decide(&self, request: &ApplicationRequest) -> DecisionRecord {
        let Some(scorer) = &self.scorer else {
            return decide(request);
        };

        let parity_hint = parity_outcome(request.salary());
        let threshold = self.config.refer_threshold;

        match scorer.score(request).and_then(checked_probability) {
            Ok(probability) => {
                let outcome = outcome_for_probability(probability, threshold);
                if outcome != parity_hint {
                    debug!(
                        model = scorer.name(),
                        %outcome,
                        %parity_hint,
                        "classifier disagrees with parity rule"
                    );
                }
                build_record(
                    outcome,
                    request.salary(),
                    Some(probability),
                    DecisionBasis::Model {
                        model: scorer.name().to_string(),
                        threshold,
                        parity_hint,
                    },
                )
            }
            Err(err) => {
                warn!(
                    model = scorer.name(),
                    error = %err,
                    "scoring failed; falling back to parity rule"
                );
                decide(request)
            }
        }
    }
}

fn checked_probability(probability: f64) -> Result<f64, ScoringUnavailable> {
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(ScoringUnavailable::InvalidProbability(probability))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    ParityRule,
    Model,
}

/// What the decision path currently is, for status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringStatus {
    pub mode: ScoringMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub threshold: f64,
}
