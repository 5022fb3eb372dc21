use super::super::domain::DecisionOutcome;

/// Offer is a fixed multiple of basic monthly salary.
pub const OFFER_SALARY_MULTIPLE: u64 = 3;

/// Odd salaries are referred, even salaries pass.
pub(crate) fn parity_outcome(salary: u64) -> DecisionOutcome {
    if salary % 2 == 1 {
        DecisionOutcome::Refer
    } else {
        DecisionOutcome::Pass
    }
}

/// Exact for every salary intake accepts (at most `u64::MAX / 3`).
pub(crate) fn offer_amount(salary: u64) -> u64 {
    salary.saturating_mul(OFFER_SALARY_MULTIPLE)
}
