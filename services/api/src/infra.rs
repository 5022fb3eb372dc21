use financing_intake::config::ScoringConfig;
use financing_intake::workflows::financing::{DecisionEngine, FinancingDecisionService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Service backed by the configured classifier, or the parity rule when none loads.
pub(crate) fn decision_service(config: &ScoringConfig) -> Arc<FinancingDecisionService> {
    Arc::new(FinancingDecisionService::new(DecisionEngine::from_config(
        config,
    )))
}
