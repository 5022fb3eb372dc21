use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::ApplicationFields;
use super::intake::ValidationError;
use super::service::FinancingDecisionService;

/// Router builder exposing HTTP endpoints for intake and decisions.
pub fn financing_router(service: Arc<FinancingDecisionService>) -> Router {
    Router::new()
        .route("/api/v1/financing/applications", post(submit_handler))
        .route(
            "/api/v1/financing/applications/validate",
            post(validate_handler),
        )
        .route("/api/v1/financing/scoring", get(scoring_handler))
        .with_state(service)
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<FinancingDecisionService>>,
    Json(fields): Json<ApplicationFields>,
) -> Response {
    match service.submit(&fields) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(error) => validation_response(&error),
    }
}

pub(crate) async fn validate_handler(
    State(service): State<Arc<FinancingDecisionService>>,
    Json(fields): Json<ApplicationFields>,
) -> Response {
    match service.preview(&fields) {
        Ok(request) => (StatusCode::OK, Json(request.summary())).into_response(),
        Err(error) => validation_response(&error),
    }
}

pub(crate) async fn scoring_handler(
    State(service): State<Arc<FinancingDecisionService>>,
) -> Response {
    (StatusCode::OK, Json(service.scoring_status())).into_response()
}

pub fn validation_payload(error: &ValidationError) -> Value {
    let mut payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });

    match error {
        ValidationError::MissingFields(fields) => {
            payload["missing_fields"] = json!(fields);
        }
        ValidationError::InvalidFormat { field, constraint } => {
            payload["field"] = json!(field);
            payload["constraint"] = json!(constraint);
        }
        ValidationError::OutOfRange { field, min, max, .. } => {
            payload["field"] = json!(field);
            payload["min"] = json!(min);
            payload["max"] = json!(max);
        }
    }

    payload
}

fn validation_response(error: &ValidationError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(validation_payload(error)),
    )
        .into_response()
}
