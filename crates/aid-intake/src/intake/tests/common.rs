use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::intake::{
    ApplicationDraft, CityChoice, EmploymentStatus, FixedClock, FormState, Gender,
    HousingStatus, LocationCatalog, MaritalStatus, MemoryDraftStore, Selection, Step1Form,
    Step2Form, Step3Form, SubmissionError, SubmissionGateway, SubmissionReceipt,
    WizardController,
};

pub(super) const US: u64 = 233;
pub(super) const CALIFORNIA: u64 = 1416;
pub(super) const NEW_YORK: u64 = 1452;
pub(super) const OUTLYING_ISLANDS: u64 = 1455;
pub(super) const SAN_FRANCISCO: u64 = 110992;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn catalog() -> Arc<LocationCatalog> {
    Arc::new(LocationCatalog::bundled().expect("bundled dataset parses"))
}

pub(super) fn personal() -> Step1Form {
    Step1Form {
        name: Some("Amina Yusuf".to_string()),
        national_id: Some("784-1990-1234567-1".to_string()),
        dob: NaiveDate::from_ymd_opt(1990, 5, 20),
        gender: Some(Gender::Female),
        address: Some("12 Harbor Road".to_string()),
        country: Selection::Selected(US),
        state: Selection::Selected(CALIFORNIA),
        city: Selection::Selected(CityChoice::City(SAN_FRANCISCO)),
        country_code: Some("US".to_string()),
        phone: Some("5551234".to_string()),
        email: Some("amina@example.org".to_string()),
    }
}

pub(super) fn household() -> Step2Form {
    Step2Form {
        marital_status: Some(MaritalStatus::Married),
        dependents: Some(2),
        employment_status: Some(EmploymentStatus::SelfEmployed),
        monthly_income: Some(1200.0),
        housing_status: Some(HousingStatus::Rent),
    }
}

pub(super) fn situation() -> Step3Form {
    Step3Form {
        current_financial_situation: Some("Two months behind on rent.".to_string()),
        employment_circumstances: Some("Hours cut in half since January.".to_string()),
        reason_for_applying: Some("Bridge the gap until hours recover.".to_string()),
    }
}

/// Gateway that records every draft it receives and can be told to fail.
#[derive(Default)]
pub(super) struct RecordingGateway {
    fail: bool,
    calls: AtomicUsize,
    drafts: Mutex<Vec<ApplicationDraft>>,
}

impl RecordingGateway {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn drafts(&self) -> Vec<ApplicationDraft> {
        self.drafts.lock().expect("gateway mutex").clone()
    }
}

#[async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn submit(&self, draft: &ApplicationDraft) -> Result<SubmissionReceipt, SubmissionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.drafts.lock().expect("gateway mutex").push(draft.clone());
        if self.fail {
            return Err(SubmissionError::Unavailable("backend offline".to_string()));
        }
        Ok(SubmissionReceipt {
            id: format!("test-{call}"),
            submitted_at: Utc::now(),
        })
    }
}

pub(super) fn wizard_with(
    store: &MemoryDraftStore,
    gateway: Arc<RecordingGateway>,
) -> WizardController {
    WizardController::new(
        FormState::restore(Arc::new(store.clone())),
        catalog(),
        gateway,
    )
    .with_clock(Arc::new(FixedClock::new(today())))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
