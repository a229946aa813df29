use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt;

use super::common::*;
use crate::intake::router::submit_household_handler;
use crate::intake::{wizard_router, MemoryDraftStore, NarrativeField, SharedWizard, WizardStep};

fn shared(gateway: Arc<RecordingGateway>) -> SharedWizard {
    Arc::new(Mutex::new(wizard_with(&MemoryDraftStore::default(), gateway)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn personal_route_accepts_valid_form_and_advances() {
    let wizard = shared(Arc::new(RecordingGateway::default()));
    let router = wizard_router(wizard.clone());

    let body = serde_json::to_value(personal()).expect("encode form");
    let response = router
        .oneshot(json_request("POST", "/api/v1/wizard/personal", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"]["step"], json!("family_financial"));
    assert_eq!(payload["accepted"]["phone"], json!("5551234"));
    assert_eq!(wizard.lock().await.step(), WizardStep::FamilyFinancial);
}

#[tokio::test]
async fn personal_route_reports_field_errors() {
    let router = wizard_router(shared(Arc::new(RecordingGateway::default())));

    let mut body = serde_json::to_value(personal()).expect("encode form");
    body["email"] = json!("not-an-email");
    body["phone"] = json!("+15551234");

    let response = router
        .oneshot(json_request("POST", "/api/v1/wizard/personal", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["fields"]["email"]["code"], json!("invalid_email"));
    assert_eq!(payload["fields"]["phone"]["code"], json!("invalid_phone"));
}

#[tokio::test]
async fn household_handler_conflicts_before_step_one() {
    let wizard = shared(Arc::new(RecordingGateway::default()));

    let response =
        submit_household_handler(State(wizard), axum::Json(household())).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("Family & Financial"));
}

#[tokio::test]
async fn situation_route_maps_gateway_failure_to_bad_gateway() {
    let wizard = shared(Arc::new(RecordingGateway::failing()));
    {
        let mut guard = wizard.lock().await;
        guard.submit_personal(personal()).expect("personal");
        guard.submit_household(household()).expect("household");
    }

    let body = serde_json::to_value(situation()).expect("encode form");
    let response = wizard_router(wizard.clone())
        .oneshot(json_request("POST", "/api/v1/wizard/situation", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(wizard.lock().await.step(), WizardStep::Situation);
}

#[tokio::test]
async fn back_route_conflicts_on_first_step() {
    let response = wizard_router(shared(Arc::new(RecordingGateway::default())))
        .oneshot(json_request("POST", "/api/v1/wizard/back", json!({})))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn assist_route_is_unavailable_without_a_generator() {
    let body = json!({ "field": NarrativeField::ReasonForApplying, "text": "help" });

    let response = wizard_router(shared(Arc::new(RecordingGateway::default())))
        .oneshot(json_request("POST", "/api/v1/wizard/assist", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn location_routes_walk_the_cascade() {
    let router = wizard_router(shared(Arc::new(RecordingGateway::default())));

    let countries = router
        .clone()
        .oneshot(get_request("/api/v1/locations/countries"))
        .await
        .expect("route executes");
    assert_eq!(countries.status(), StatusCode::OK);
    let countries = read_json_body(countries).await;
    assert!(countries
        .as_array()
        .expect("array")
        .iter()
        .any(|country| country["id"] == json!(US)));

    let cities = router
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/locations/countries/{US}/states/{CALIFORNIA}/cities"
        )))
        .await
        .expect("route executes");
    let cities = read_json_body(cities).await;
    assert_eq!(cities[0]["kind"], json!("city"));
    assert_eq!(cities[0]["label"], json!("San Francisco"));

    let outlying = router
        .oneshot(get_request(&format!(
            "/api/v1/locations/countries/{US}/states/{OUTLYING_ISLANDS}/cities"
        )))
        .await
        .expect("route executes");
    let outlying = read_json_body(outlying).await;
    assert_eq!(
        outlying,
        json!([{ "kind": "none_available", "label": "No cities available" }])
    );
}

#[tokio::test]
async fn status_route_reports_current_step() {
    let response = wizard_router(shared(Arc::new(RecordingGateway::default())))
        .oneshot(get_request("/api/v1/wizard"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["step"], json!("personal_details"));
    assert_eq!(payload["stepNumber"], json!(1));
    assert_eq!(payload["totalSteps"], json!(3));
    assert_eq!(payload["hasDraft"], json!(false));
}
