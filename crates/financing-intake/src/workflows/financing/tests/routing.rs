use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::financing::domain::ApplicationFields;
use crate::workflows::financing::router::{
    scoring_handler, submit_handler, validate_handler, validation_payload,
};
use crate::workflows::financing::{
    financing_router, ApplicationField, FinancingDecisionService, FormatConstraint,
    ValidationError,
};

fn post_json(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("build request")
}

#[tokio::test]
async fn submit_handler_returns_receipt_for_valid_fields() {
    let service = Arc::new(rule_service());

    let response = submit_handler(State(service), axum::Json(fields())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"]["outcome"], "PASS");
    assert_eq!(payload["decision"]["offer_amount"], 45_000);
    assert!(payload["application_id"]
        .as_str()
        .is_some_and(|id| id.starts_with("app-")));
}

#[tokio::test]
async fn submit_handler_returns_unprocessable_for_invalid_fields() {
    let service = Arc::new(rule_service());
    let fields = ApplicationFields {
        national_id: Some("12345".to_string()),
        ..fields()
    };

    let response = submit_handler(State(service), axum::Json(fields)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "invalid_format");
    assert_eq!(payload["field"], "national_id");
    assert_eq!(payload["constraint"], "ten_digits");
    assert!(payload.get("decision").is_none());
}

#[tokio::test]
async fn validate_handler_returns_masked_summary() {
    let service = Arc::new(rule_service());

    let response = validate_handler(State(service), axum::Json(fields())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["national_id"], "******6789");
    assert_eq!(payload["mobile"], "+966512345678");
    assert!(payload.get("decision").is_none());
}

#[tokio::test]
async fn scoring_handler_reports_rule_mode() {
    let service = Arc::new(rule_service());

    let response = scoring_handler(State(service)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "mode": "parity_rule", "threshold": 0.5 }));
}

#[tokio::test]
async fn submit_route_refers_odd_salaries() {
    let router = financing_router(Arc::new(rule_service()));
    let body = json!({
        "full_name": "Mohammed Ahmed Al-Omari",
        "national_id": "1023456789",
        "mobile": "0512345678",
        "email": "m.alomari@example.com",
        "age": 30,
        "employment_sector": "Private",
        "salary": 15001,
        "requested_amount": 50000
    });

    let response = router
        .oneshot(post_json("/api/v1/financing/applications", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"]["outcome"], "REFER");
    assert!(payload["decision"].get("offer_amount").is_none());
}

#[tokio::test]
async fn submit_route_lists_missing_fields() {
    let router = financing_router(Arc::new(rule_service()));

    let response = router
        .oneshot(post_json(
            "/api/v1/financing/applications",
            json!({ "full_name": "Sara", "age": "30" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "missing_fields");
    assert_eq!(
        payload["missing_fields"],
        json!([
            "national_id",
            "mobile",
            "email",
            "employment_sector",
            "salary",
            "requested_amount"
        ])
    );
}

#[tokio::test]
async fn scoring_route_names_the_loaded_model() {
    let router = financing_router(Arc::new(FinancingDecisionService::new(model_engine())));

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/financing/scoring")
                .body(axum::body::Body::empty())
                .expect("build request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["mode"], "model");
    assert_eq!(payload["model"], "fraud-logit-test");
}

#[test]
fn out_of_range_payload_carries_bounds() {
    let payload = validation_payload(&ValidationError::OutOfRange {
        field: ApplicationField::Age,
        min: 18,
        max: 65,
        found: 70,
    });

    assert_eq!(payload["field"], "age");
    assert_eq!(payload["min"], 18);
    assert_eq!(payload["max"], 65);
    assert_eq!(payload["error"], "age must be between 18 and 65 (found 70)");

    let payload = validation_payload(&ValidationError::InvalidFormat {
        field: ApplicationField::Mobile,
        constraint: FormatConstraint::SaudiMobile,
    });
    assert_eq!(payload["constraint"], "saudi_mobile");
}
