use std::sync::Arc;

use super::common::*;
use crate::intake::{
    ApplicationDraft, CityChoice, CityOption, DraftStore, FieldError, MemoryDraftStore, Selection,
    Step1Form, WizardError, WizardStep, DRAFT_STORAGE_KEY,
};

#[tokio::test]
async fn full_run_submits_merged_draft_and_clears_storage() {
    let store = MemoryDraftStore::default();
    let gateway = Arc::new(RecordingGateway::default());
    let mut wizard = wizard_with(&store, gateway.clone());

    wizard.submit_personal(personal()).expect("personal accepted");
    assert_eq!(wizard.step(), WizardStep::FamilyFinancial);
    wizard.submit_household(household()).expect("household accepted");
    assert_eq!(wizard.step(), WizardStep::Situation);
    assert!(store.contains(DRAFT_STORAGE_KEY));

    let receipt = wizard
        .submit_situation(situation())
        .await
        .expect("submission accepted");

    assert_eq!(receipt.id, "test-1");
    assert_eq!(wizard.step(), WizardStep::Submitted);
    assert!(wizard.draft().is_empty());
    assert!(!store.contains(DRAFT_STORAGE_KEY));

    let submitted = gateway.drafts().pop().expect("one submission");
    let step1 = submitted.step1.expect("step1 present");
    assert_eq!(step1.phone.as_deref(), Some("+15551234"));
    assert_eq!(submitted.step2, Some(household()));
    assert_eq!(submitted.step3, Some(situation()));

    let status = wizard.status();
    assert_eq!(status.step_number, 4);
    assert!(!status.has_draft);
    assert_eq!(status.receipt, Some(receipt));
}

#[test]
fn failed_validation_leaves_storage_untouched() {
    let store = MemoryDraftStore::default();
    let mut wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    let underage = Step1Form {
        dob: today().checked_sub_months(chrono::Months::new(12 * 18)).and_then(|d| d.succ_opt()),
        ..personal()
    };

    match wizard.submit_personal(underage) {
        Err(WizardError::Validation(errors)) => {
            assert_eq!(errors.get("dob"), Some(FieldError::Underage));
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(wizard.step(), WizardStep::PersonalDetails);
    assert!(!store.contains(DRAFT_STORAGE_KEY));
}

#[test]
fn exactly_eighteen_today_is_accepted() {
    let store = MemoryDraftStore::default();
    let mut wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    let birthday = Step1Form {
        dob: today().checked_sub_months(chrono::Months::new(12 * 18)),
        ..personal()
    };

    wizard.submit_personal(birthday).expect("eighteenth birthday passes");
}

#[tokio::test]
async fn steps_cannot_be_submitted_out_of_order() {
    let store = MemoryDraftStore::default();
    let gateway = Arc::new(RecordingGateway::default());
    let mut wizard = wizard_with(&store, gateway.clone());

    let err = wizard
        .submit_household(household())
        .expect_err("household is not current");
    assert!(matches!(
        err,
        WizardError::OutOfOrder {
            current: WizardStep::PersonalDetails,
            attempted: WizardStep::FamilyFinancial,
        }
    ));

    let err = wizard
        .submit_situation(situation())
        .await
        .expect_err("situation is not current");
    assert!(matches!(err, WizardError::OutOfOrder { .. }));
    assert_eq!(gateway.calls(), 0);
    assert!(wizard.draft().is_empty());
}

#[test]
fn going_back_keeps_stored_answers() {
    let store = MemoryDraftStore::default();
    let mut wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    wizard.submit_personal(personal()).expect("personal accepted");
    wizard.submit_household(household()).expect("household accepted");

    assert_eq!(wizard.back().expect("back to step 2"), WizardStep::FamilyFinancial);
    assert_eq!(wizard.household_form(), household());
    assert_eq!(wizard.back().expect("back to step 1"), WizardStep::PersonalDetails);
    assert_eq!(wizard.personal_form(), personal());

    assert!(matches!(
        wizard.back(),
        Err(WizardError::NoPreviousStep(WizardStep::PersonalDetails))
    ));
}

#[tokio::test]
async fn gateway_failure_keeps_draft_and_step() {
    let store = MemoryDraftStore::default();
    let gateway = Arc::new(RecordingGateway::failing());
    let mut wizard = wizard_with(&store, gateway.clone());

    wizard.submit_personal(personal()).expect("personal accepted");
    wizard.submit_household(household()).expect("household accepted");

    let err = wizard
        .submit_situation(situation())
        .await
        .expect_err("backend offline");

    assert!(matches!(err, WizardError::Submission(_)));
    assert_eq!(wizard.step(), WizardStep::Situation);
    assert_eq!(wizard.situation_form(), situation());
    assert!(store.contains(DRAFT_STORAGE_KEY));
    assert_eq!(gateway.calls(), 1);
}

#[test]
fn state_without_cities_stores_sentinel_city() {
    let store = MemoryDraftStore::default();
    let mut wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    let mut form = personal();
    form.select_state(Selection::Selected(OUTLYING_ISLANDS));
    assert_eq!(form.city, Selection::Unset);

    let details = wizard.submit_personal(form).expect("sentinel accepted");

    assert_eq!(details.city, CityChoice::NoneAvailable);
    let stored = wizard.draft().step1.clone().expect("stored");
    assert_eq!(stored.city, Selection::Selected(CityChoice::NoneAvailable));
}

#[test]
fn stored_strings_are_trimmed() {
    let store = MemoryDraftStore::default();
    let mut wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    let padded = Step1Form {
        name: Some("  Amina Yusuf  ".to_string()),
        email: Some(" amina@example.org ".to_string()),
        ..personal()
    };
    wizard.submit_personal(padded).expect("accepted");

    let stored = wizard.draft().step1.clone().expect("stored");
    assert_eq!(stored.name.as_deref(), Some("Amina Yusuf"));
    assert_eq!(stored.email.as_deref(), Some("amina@example.org"));
}

#[test]
fn restored_phone_without_country_code_infers_one() {
    let store = MemoryDraftStore::default();
    let legacy = ApplicationDraft {
        step1: Some(Step1Form {
            country_code: None,
            phone: Some("+12425551234".to_string()),
            ..personal()
        }),
        ..ApplicationDraft::default()
    };
    store
        .write(
            DRAFT_STORAGE_KEY,
            &serde_json::to_string(&legacy).expect("encode"),
        )
        .expect("seed store");

    let wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));
    let form = wizard.personal_form();

    assert_eq!(form.country_code.as_deref(), Some("BS"));
    assert_eq!(form.phone.as_deref(), Some("5551234"));
    assert!(wizard.status().has_draft);
}

#[tokio::test]
async fn new_application_only_after_submission() {
    let store = MemoryDraftStore::default();
    let mut wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    assert!(matches!(
        wizard.start_new(),
        Err(WizardError::OutOfOrder { .. })
    ));

    wizard.submit_personal(personal()).expect("personal");
    wizard.submit_household(household()).expect("household");
    wizard.submit_situation(situation()).await.expect("submitted");

    assert_eq!(wizard.start_new().expect("restart"), WizardStep::PersonalDetails);
    assert!(wizard.receipt().is_none());
    assert_eq!(wizard.personal_form(), Step1Form::default());
}

#[test]
fn option_builders_follow_the_cascade() {
    let store = MemoryDraftStore::default();
    let wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    assert!(wizard.state_options(Selection::Unset).is_empty());
    assert!(wizard
        .city_options(Selection::Selected(US), Selection::Unset)
        .is_empty());

    let states = wizard.state_options(Selection::Selected(US));
    assert!(states.iter().any(|state| state.id == NEW_YORK));

    let outlying = wizard.city_options(
        Selection::Selected(US),
        Selection::Selected(OUTLYING_ISLANDS),
    );
    assert_eq!(outlying.len(), 1);
    assert!(matches!(outlying[0], CityOption::NoneAvailable { .. }));
}

#[tokio::test]
async fn assist_without_a_generator_is_reported_as_failure() {
    let store = MemoryDraftStore::default();
    let wizard = wizard_with(&store, Arc::new(RecordingGateway::default()));

    let err = wizard
        .request_assist(crate::intake::NarrativeField::ReasonForApplying, "help")
        .await
        .expect_err("no generator configured");
    assert!(err.to_string().contains("not configured"));
    assert!(!wizard.status().assist_available);
}
