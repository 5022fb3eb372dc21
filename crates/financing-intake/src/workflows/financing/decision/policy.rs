use super::super::domain::{DecisionBasis, DecisionOutcome, DecisionRecord};
use super::rules::offer_amount;

/// `probability > threshold` refers; equality passes.
pub(crate) fn outcome_for_probability(probability: f64, threshold: f64) -> DecisionOutcome {
    if probability > threshold {
        DecisionOutcome::Refer
    } else {
        DecisionOutcome::Pass
    }
}

pub(crate) fn build_record(
    outcome: DecisionOutcome,
    salary: u64,
    risk_score: Option<f64>,
    basis: DecisionBasis,
) -> DecisionRecord {
    DecisionRecord {
        outcome,
        offer_amount: outcome.is_pass().then(|| offer_amount(salary)),
        risk_score,
        basis,
    }
}
