use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::decision::{DecisionEngine, ScoringStatus};
use super::domain::{
    ApplicationFields, ApplicationId, ApplicationRequest, DecisionReceipt, DecisionRecord,
};
use super::intake::{validate_at, ValidationError};

/// Facade composing intake validation and the decision engine.
pub struct FinancingDecisionService {
    engine: Arc<DecisionEngine>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl FinancingDecisionService {
    pub fn new(engine: DecisionEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn scoring_status(&self) -> ScoringStatus {
        self.engine.status()
    }

    /// Validate without deciding, for inline form feedback.
    pub fn preview(
        &self,
        fields: &ApplicationFields,
    ) -> Result<ApplicationRequest, ValidationError> {
        self.accept(fields, Utc::now())
    }

    pub fn submit(&self, fields: &ApplicationFields) -> Result<DecisionReceipt, ValidationError> {
        self.submit_at(fields, Utc::now())
    }

    /// Validate and decide in one step, assigning a fresh application id.
    pub fn submit_at(
        &self,
        fields: &ApplicationFields,
        received_at: DateTime<Utc>,
    ) -> Result<DecisionReceipt, ValidationError> {
        let request = self.accept(fields, received_at)?;
        let decision = self.decide(&request);
        let application_id = next_application_id();

        info!(
            application_id = %application_id.0,
            outcome = %decision.outcome,
            basis = decision.basis.label(),
            offer_amount = decision.offer_amount,
            "financing decision recorded"
        );

        Ok(DecisionReceipt {
            application_id,
            applicant: request.summary(),
            decision,
        })
    }

    pub fn decide(&self, request: &ApplicationRequest) -> DecisionRecord {
        self.engine.decide(request)
    }

    fn accept(
        &self,
        fields: &ApplicationFields,
        received_at: DateTime<Utc>,
    ) -> Result<ApplicationRequest, ValidationError> {
        validate_at(fields, received_at).map_err(|err| {
            debug!(kind = err.kind(), field = ?err.field(), "application rejected at intake");
            err
        })
    }
}
