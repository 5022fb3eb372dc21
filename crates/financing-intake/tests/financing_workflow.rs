//! Integration specifications for financing intake, decisions, and the wizard session.
//!
//! Scenarios go through the public service facade, the HTTP router, and artifact loading
//! from disk, without reaching into private modules.

mod common {
    use std::fs;
    use std::path::PathBuf;

    use chrono::{DateTime, TimeZone, Utc};

    use financing_intake::workflows::financing::ApplicationFields;

    pub(super) const MODEL_JSON: &str = r#"{
        "name": "fraud-logit-disk",
        "intercept": -1.0,
        "columns": [
            { "name": "Total Amounts", "kind": "numeric", "weight": 2.0, "offset": 100000, "scale": 100000 },
            { "name": "Product Type", "kind": "categorical", "levels": { "Personal Loan": 1.0 } },
            { "name": "Login GPS Country", "kind": "categorical",
              "levels": { "Saudi Arabia": 0.0, "Nigeria": 4.0 } }
        ]
    }"#;

    pub(super) const REFERENCE_CSV: &str = "\
Total Amounts,Product Type,Login GPS Country
80000,Personal Loan,Saudi Arabia
120000,Personal Loan,Saudi Arabia
150000,Auto Loan,Nigeria
";

    pub(super) fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn fields(salary: &str, requested_amount: &str) -> ApplicationFields {
        ApplicationFields {
            full_name: Some("Noura Al-Harbi".to_string()),
            national_id: Some("1122334455".to_string()),
            mobile: Some("0551234567".to_string()),
            email: Some("noura@example.sa".to_string()),
            age: Some("35".to_string()),
            employment_sector: Some("Government".to_string()),
            salary: Some(salary.to_string()),
            requested_amount: Some(requested_amount.to_string()),
        }
    }

    /// Artifact files scoped to one test, removed on drop.
    pub(super) struct Artifacts {
        pub(super) model: PathBuf,
        pub(super) reference: PathBuf,
    }

    impl Artifacts {
        pub(super) fn write(tag: &str) -> Self {
            let dir = std::env::temp_dir();
            let stem = format!("financing-intake-{}-{tag}", std::process::id());
            let model = dir.join(format!("{stem}-model.json"));
            let reference = dir.join(format!("{stem}-reference.csv"));
            fs::write(&model, MODEL_JSON).expect("write model");
            fs::write(&reference, REFERENCE_CSV).expect("write reference");
            Self { model, reference }
        }
    }

    impl Drop for Artifacts {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.model);
            let _ = fs::remove_file(&self.reference);
        }
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use financing_intake::config::ScoringConfig;
use financing_intake::workflows::financing::{
    decide, financing_router, validate_at, ApplicationSession, DecisionBasis, DecisionEngine,
    DecisionOutcome, FinancingDecisionService, ScoringMode, SessionStage, ValidationError,
};

use common::*;

#[test]
fn even_salary_passes_through_the_whole_wizard() {
    let request = validate_at(&fields("15000", "50000"), received_at()).expect("valid");
    let mut session = ApplicationSession::new();

    session.begin_verification(request).expect("verify");
    let decision = decide(session.request().expect("request held"));
    session.record_decision(decision).expect("decide");
    session.finalize().expect("finalize");
    session.close().expect("close");

    assert_eq!(session.stage(), SessionStage::Closed);
    let decision = session.decision().expect("decision held");
    assert_eq!(decision.outcome, DecisionOutcome::Pass);
    assert_eq!(decision.offer_amount, Some(45_000));
}

#[test]
fn odd_salary_is_referred() {
    let request = validate_at(&fields("15001", "50000"), received_at()).expect("valid");
    let decision = decide(&request);

    assert_eq!(decision.outcome, DecisionOutcome::Refer);
    assert_eq!(decision.offer_amount, None);
}

#[test]
fn short_national_id_never_reaches_a_decision() {
    let mut fields = fields("15000", "50000");
    fields.national_id = Some("12345".to_string());

    let error = validate_at(&fields, received_at()).expect_err("rejected");
    assert!(matches!(error, ValidationError::InvalidFormat { .. }));
    assert_eq!(error.to_string(), "national_id must be exactly 10 digits");
}

#[test]
fn classifier_loaded_from_disk_overrides_the_rule() {
    let artifacts = Artifacts::write("override");
    let engine = DecisionEngine::from_config(&ScoringConfig {
        model_path: Some(artifacts.model.clone()),
        reference_path: Some(artifacts.reference.clone()),
        refer_threshold: 0.5,
    });
    assert_eq!(engine.status().mode, ScoringMode::Model);
    assert_eq!(engine.status().model.as_deref(), Some("fraud-logit-disk"));

    // logit = -1 + 2 * (300000 - 100000) / 100000 + 1 + 0 = 4
    let large = validate_at(&fields("15000", "300000"), received_at()).expect("valid");
    let record = engine.decide(&large);
    assert_eq!(record.outcome, DecisionOutcome::Refer);
    assert!(matches!(
        record.basis,
        DecisionBasis::Model {
            parity_hint: DecisionOutcome::Pass,
            ..
        }
    ));

    // logit = -1 + 2 * (20000 - 100000) / 100000 + 1 + 0 = -1.6
    let small = validate_at(&fields("15001", "20000"), received_at()).expect("valid");
    let record = engine.decide(&small);
    assert_eq!(record.outcome, DecisionOutcome::Pass);
    assert_eq!(record.offer_amount, Some(45_003));
}

#[test]
fn unreadable_classifier_falls_back_to_the_rule() {
    let artifacts = Artifacts::write("fallback");
    std::fs::write(&artifacts.model, "{ not json").expect("corrupt model");

    let engine = DecisionEngine::from_config(&ScoringConfig {
        model_path: Some(artifacts.model.clone()),
        reference_path: Some(artifacts.reference.clone()),
        refer_threshold: 0.5,
    });

    assert_eq!(engine.status().mode, ScoringMode::ParityRule);
    let request = validate_at(&fields("15000", "300000"), received_at()).expect("valid");
    assert_eq!(engine.decide(&request), decide(&request));
}

#[tokio::test]
async fn submit_route_returns_decision_receipt() {
    let service = Arc::new(FinancingDecisionService::new(DecisionEngine::from_config(
        &ScoringConfig::default(),
    )));
    let router = financing_router(service);
    let body = serde_json::json!({
        "full_name": "Noura Al-Harbi",
        "national_id": "1122334455",
        "mobile": "+966 55 123 4567",
        "email": "noura@example.sa",
        "age": 35,
        "employment_sector": "Semi-government",
        "salary": "12345",
        "requested_amount": 40000
    });

    let response = router
        .oneshot(
            Request::post("/api/v1/financing/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
                .expect("build request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json payload");
    assert_eq!(payload["decision"]["outcome"], "REFER");
    assert_eq!(payload["applicant"]["employment_sector"], "Semi-government");
    assert_eq!(payload["applicant"]["national_id"], "******4455");
}
