use std::io::Cursor;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::financing::domain::{ApplicationFields, ApplicationRequest};
use crate::workflows::financing::intake::validate_at;
use crate::workflows::financing::scoring::{
    FraudClassifier, LogisticModel, ReferenceDataset, RiskScorer, ScoringUnavailable,
};
use crate::workflows::financing::{DecisionConfig, DecisionEngine, FinancingDecisionService};

pub(super) const MODEL_JSON: &str = r#"{
    "name": "fraud-logit-test",
    "intercept": -2.0,
    "columns": [
        { "name": "Total Amounts", "kind": "numeric", "weight": 1.0, "offset": 50000, "scale": 50000 },
        { "name": "Login GPS Country", "kind": "categorical",
          "levels": { "Saudi Arabia": -1.0, "United Arab Emirates": 3.0 } },
        { "name": "Trusted Device Status", "kind": "categorical", "default": { "fixed": "No" },
          "levels": { "Yes": -1.0, "No": 2.5 } },
        { "name": "Account Opening Date", "kind": "datetime", "weight": 0.0 },
        { "name": "Product Type", "kind": "categorical", "levels": { "Personal Loan": 0.5 } }
    ]
}"#;

pub(super) const REFERENCE_CSV: &str = "\
Total Amounts,Login GPS Country,Trusted Device Status,Account Opening Date,Product Type
40000,Saudi Arabia,Yes,2020-01-01,Personal Loan
60000,Saudi Arabia,Yes,2021-01-01,Personal Loan
90000,United Arab Emirates,No,2024-06-01,Auto Loan
";

pub(super) fn received_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn fields() -> ApplicationFields {
    ApplicationFields {
        full_name: Some("Mohammed Ahmed Al-Omari".to_string()),
        national_id: Some("1023456789".to_string()),
        mobile: Some("+966 512 345 678".to_string()),
        email: Some("m.alomari@example.com".to_string()),
        age: Some("30".to_string()),
        employment_sector: Some("Private".to_string()),
        salary: Some("15000".to_string()),
        requested_amount: Some("50000".to_string()),
    }
}

pub(super) fn fields_with_salary(salary: u64) -> ApplicationFields {
    ApplicationFields {
        salary: Some(salary.to_string()),
        ..fields()
    }
}

pub(super) fn request_with(salary: u64, requested_amount: u64) -> ApplicationRequest {
    let fields = ApplicationFields {
        salary: Some(salary.to_string()),
        requested_amount: Some(requested_amount.to_string()),
        ..fields()
    };
    validate_at(&fields, received_at()).expect("fixture validates")
}

pub(super) fn request(salary: u64) -> ApplicationRequest {
    request_with(salary, 50_000)
}

pub(super) fn reference() -> ReferenceDataset {
    ReferenceDataset::from_reader(Cursor::new(REFERENCE_CSV)).expect("reference parses")
}

pub(super) fn model() -> LogisticModel {
    LogisticModel::from_reader(Cursor::new(MODEL_JSON)).expect("model parses")
}

pub(super) fn classifier() -> FraudClassifier {
    FraudClassifier::new(model(), &reference()).expect("schema resolves")
}

pub(super) fn model_engine() -> DecisionEngine {
    DecisionEngine::with_scorer(DecisionConfig::default(), Arc::new(classifier()))
}

pub(super) fn rule_service() -> FinancingDecisionService {
    FinancingDecisionService::new(DecisionEngine::new(DecisionConfig::default()))
}

/// Returns the same probability for every request.
pub(super) struct FixedScorer(pub(super) f64);

impl RiskScorer for FixedScorer {
    fn name(&self) -> &str {
        "fixed"
    }

    fn score(&self, _request: &ApplicationRequest) -> Result<f64, ScoringUnavailable> {
        Ok(self.0)
    }
}

pub(super) struct BrokenScorer;

impl RiskScorer for BrokenScorer {
    fn name(&self) -> &str {
        "broken"
    }

    fn score(&self, _request: &ApplicationRequest) -> Result<f64, ScoringUnavailable> {
        Err(ScoringUnavailable::InvalidModel("weights corrupted".to_string()))
    }
}

pub(super) fn engine_with(scorer: impl RiskScorer + 'static) -> DecisionEngine {
    DecisionEngine::with_scorer(DecisionConfig::default(), Arc::new(scorer))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
