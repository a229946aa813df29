use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use super::assist::AssistError;
use super::domain::{LocationId, NarrativeField, Selection, Step1Form, Step2Form, Step3Form};
use super::validation::ValidationErrors;
use super::wizard::{WizardController, WizardError};

/// One wizard session shared by every request.
pub type SharedWizard = Arc<Mutex<WizardController>>;

/// Router exposing the wizard steps, assist, and the location selects.
pub fn wizard_router(wizard: SharedWizard) -> Router {
    Router::new()
        .route("/api/v1/wizard", get(status_handler))
        .route(
            "/api/v1/wizard/personal",
            get(personal_form_handler).post(submit_personal_handler),
        )
        .route(
            "/api/v1/wizard/household",
            get(household_form_handler).post(submit_household_handler),
        )
        .route(
            "/api/v1/wizard/situation",
            get(situation_form_handler).post(submit_situation_handler),
        )
        .route("/api/v1/wizard/back", post(back_handler))
        .route("/api/v1/wizard/restart", post(restart_handler))
        .route("/api/v1/wizard/assist", post(assist_handler))
        .route("/api/v1/dial-codes", get(dial_codes_handler))
        .route("/api/v1/locations/countries", get(countries_handler))
        .route(
            "/api/v1/locations/countries/:country/states",
            get(states_handler),
        )
        .route(
            "/api/v1/locations/countries/:country/states/:state/cities",
            get(cities_handler),
        )
        .with_state(wizard)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistPayload {
    pub field: NarrativeField,
    #[serde(default)]
    pub text: String,
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn validation_response(errors: &ValidationErrors) -> Response {
    let fields: Map<String, Value> = errors
        .iter()
        .map(|(field, error)| {
            (
                field.to_string(),
                json!({ "code": error, "message": error.message() }),
            )
        })
        .collect();
    let payload = json!({
        "error": "validation failed",
        "fields": fields,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

fn wizard_error_response(error: WizardError) -> Response {
    match error {
        WizardError::Validation(errors) => validation_response(&errors),
        WizardError::OutOfOrder { .. } | WizardError::NoPreviousStep(_) => {
            error_body(StatusCode::CONFLICT, error.to_string())
        }
        WizardError::Submission(err) => error_body(StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

pub(crate) async fn status_handler(State(wizard): State<SharedWizard>) -> Response {
    let wizard = wizard.lock().await;
    (StatusCode::OK, Json(wizard.status())).into_response()
}

pub(crate) async fn personal_form_handler(State(wizard): State<SharedWizard>) -> Response {
    let wizard = wizard.lock().await;
    (StatusCode::OK, Json(wizard.personal_form())).into_response()
}

pub(crate) async fn submit_personal_handler(
    State(wizard): State<SharedWizard>,
    Json(values): Json<Step1Form>,
) -> Response {
    let mut wizard = wizard.lock().await;
    match wizard.submit_personal(values) {
        Ok(details) => {
            let payload = json!({ "status": wizard.status(), "accepted": details });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => wizard_error_response(err),
    }
}

pub(crate) async fn household_form_handler(State(wizard): State<SharedWizard>) -> Response {
    let wizard = wizard.lock().await;
    (StatusCode::OK, Json(wizard.household_form())).into_response()
}

pub(crate) async fn submit_household_handler(
    State(wizard): State<SharedWizard>,
    Json(values): Json<Step2Form>,
) -> Response {
    let mut wizard = wizard.lock().await;
    match wizard.submit_household(values) {
        Ok(household) => {
            let payload = json!({ "status": wizard.status(), "accepted": household });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => wizard_error_response(err),
    }
}

pub(crate) async fn situation_form_handler(State(wizard): State<SharedWizard>) -> Response {
    let wizard = wizard.lock().await;
    (StatusCode::OK, Json(wizard.situation_form())).into_response()
}

pub(crate) async fn submit_situation_handler(
    State(wizard): State<SharedWizard>,
    Json(values): Json<Step3Form>,
) -> Response {
    let mut wizard = wizard.lock().await;
    match wizard.submit_situation(values).await {
        Ok(receipt) => {
            let payload = json!({ "status": wizard.status(), "receipt": receipt });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => wizard_error_response(err),
    }
}

pub(crate) async fn back_handler(State(wizard): State<SharedWizard>) -> Response {
    let mut wizard = wizard.lock().await;
    match wizard.back() {
        Ok(_) => (StatusCode::OK, Json(wizard.status())).into_response(),
        Err(err) => wizard_error_response(err),
    }
}

pub(crate) async fn restart_handler(State(wizard): State<SharedWizard>) -> Response {
    let mut wizard = wizard.lock().await;
    match wizard.start_new() {
        Ok(_) => (StatusCode::OK, Json(wizard.status())).into_response(),
        Err(err) => wizard_error_response(err),
    }
}

/// The controller lock is released before the generator is awaited, so other
/// routes stay responsive while a suggestion is pending.
pub(crate) async fn assist_handler(
    State(wizard): State<SharedWizard>,
    Json(payload): Json<AssistPayload>,
) -> Response {
    let assist = wizard.lock().await.assist();
    let Some(assist) = assist else {
        return error_body(
            StatusCode::SERVICE_UNAVAILABLE,
            "text assistance is not configured",
        );
    };

    match assist.suggest(payload.field, &payload.text).await {
        Ok(suggestion) => (StatusCode::OK, Json(suggestion)).into_response(),
        Err(err @ AssistError::Empty(_)) => {
            error_body(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        Err(err @ AssistError::InFlight(_)) => error_body(StatusCode::CONFLICT, err.to_string()),
        Err(err @ AssistError::RequestFailed { .. }) => {
            error_body(StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}

pub(crate) async fn dial_codes_handler(State(wizard): State<SharedWizard>) -> Response {
    let wizard = wizard.lock().await;
    (StatusCode::OK, Json(wizard.dial_codes())).into_response()
}

pub(crate) async fn countries_handler(State(wizard): State<SharedWizard>) -> Response {
    let wizard = wizard.lock().await;
    (StatusCode::OK, Json(wizard.country_options())).into_response()
}

pub(crate) async fn states_handler(
    State(wizard): State<SharedWizard>,
    Path(country): Path<LocationId>,
) -> Response {
    let wizard = wizard.lock().await;
    let options = wizard.state_options(Selection::Selected(country));
    (StatusCode::OK, Json(options)).into_response()
}

pub(crate) async fn cities_handler(
    State(wizard): State<SharedWizard>,
    Path((country, state)): Path<(LocationId, LocationId)>,
) -> Response {
    let wizard = wizard.lock().await;
    let options = wizard.city_options(Selection::Selected(country), Selection::Selected(state));
    (StatusCode::OK, Json(options)).into_response()
}
