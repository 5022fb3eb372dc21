//! Financing application intake and fraud-referral decisions.
//!
//! Raw form fields are validated into an immutable [`ApplicationRequest`],
//! which a pure decision step turns into a [`DecisionRecord`]. Wizard state
//! lives in [`ApplicationSession`] and is owned by the presentation layer.

pub mod decision;
pub mod domain;
pub mod intake;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use decision::{
    decide, DecisionConfig, DecisionEngine, ScoringMode, ScoringStatus, OFFER_SALARY_MULTIPLE,
};
pub use domain::{
    ApplicantSummary, ApplicationField, ApplicationFields, ApplicationId, ApplicationRequest,
    DecisionBasis, DecisionOutcome, DecisionReceipt, DecisionRecord, EmploymentSector,
};
pub use intake::{normalize_mobile, validate, validate_at, FormatConstraint, ValidationError};
pub use router::financing_router;
pub use scoring::{FraudClassifier, RiskScorer, ScoringUnavailable};
pub use service::FinancingDecisionService;
pub use session::{ApplicationSession, SessionAction, SessionError, SessionStage};
