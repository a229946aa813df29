use aid_intake::config::AssistConfig;
use aid_intake::error::AppError;
use aid_intake::intake::{
    AssistRequester, ChatCompletionsClient, CityOption, EmploymentStatus, FixedClock, FormState,
    Gender, HousingStatus, LocationCatalog, LocationOption, MaritalStatus, MemoryDraftStore,
    MockSubmissionGateway, NarrativeField, Selection, Step1Form, Step2Form, Step3Form,
    WizardController, WizardError,
};
use chrono::{Local, Months, NaiveDate};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pin "today" for the age check (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Simulated backend latency in milliseconds.
    #[arg(long, default_value_t = 800)]
    pub(crate) submission_delay_ms: u64,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let catalog = LocationCatalog::bundled()?;

    println!("Assistance application demo ({today})");
    let Some((country, state, city)) = pick_location(&catalog) else {
        println!("  Bundled location data has no state with cities; nothing to demo.");
        return Ok(());
    };
    println!(
        "- Location: {} / {} / {}",
        country.label, state.label, city_label(&city)
    );

    let generator = Arc::new(ChatCompletionsClient::from_config(&AssistConfig::default()));
    let mut wizard = WizardController::new(
        FormState::restore(Arc::new(MemoryDraftStore::default())),
        Arc::new(catalog),
        Arc::new(MockSubmissionGateway::new(Duration::from_millis(
            args.submission_delay_ms,
        ))),
    )
    .with_clock(Arc::new(FixedClock::new(today)))
    .with_assist(Arc::new(AssistRequester::new(generator)));

    let adult_dob = years_before(today, 30);
    let minor_dob = years_before(today, 17);

    let mut personal = Step1Form {
        name: Some("Jordan Rivera".to_string()),
        national_id: Some("X1234567".to_string()),
        dob: minor_dob,
        gender: Some(Gender::Other),
        address: Some("100 Market Street".to_string()),
        country_code: Some("US".to_string()),
        phone: Some("5551234".to_string()),
        email: Some("jordan@example.com".to_string()),
        ..Step1Form::default()
    };
    personal.select_country(Selection::Selected(country.id));
    personal.select_state(Selection::Selected(state.id));
    personal.select_city(Selection::Selected(city.choice()));

    println!("\nStep 1: {}", wizard.status().label);
    match wizard.submit_personal(personal.clone()) {
        Err(WizardError::Validation(errors)) => {
            for (field, error) in errors.iter() {
                println!("  rejected {field}: {}", error.message());
            }
        }
        Err(err) => println!("  unexpected failure: {err}"),
        Ok(_) => println!("  unexpectedly accepted an underage applicant"),
    }

    personal.dob = adult_dob;
    if let Err(err) = wizard.submit_personal(personal) {
        println!("  Personal details rejected: {err}");
        return Ok(());
    }
    let stored_phone = wizard
        .draft()
        .step1
        .as_ref()
        .and_then(|step| step.phone.clone())
        .unwrap_or_default();
    let edit_phone = wizard.personal_form().phone.unwrap_or_default();
    println!("  accepted; stored phone {stored_phone}, edit form shows {edit_phone}");

    println!("\nStep 2: {}", wizard.status().label);
    let household = Step2Form {
        marital_status: Some(MaritalStatus::Single),
        dependents: Some(1),
        employment_status: Some(EmploymentStatus::Unemployed),
        monthly_income: Some(650.0),
        housing_status: Some(HousingStatus::Rent),
    };
    if let Err(err) = wizard.submit_household(household) {
        println!("  Household answers rejected: {err}");
        return Ok(());
    }
    println!("  accepted");

    println!("\nStep 3: {}", wizard.status().label);
    if let Err(err) = wizard
        .request_assist(NarrativeField::ReasonForApplying, "   ")
        .await
    {
        println!("  assist declined: {err}");
    }

    let situation = Step3Form {
        current_financial_situation: Some("Savings ran out after two months without work.".to_string()),
        employment_circumstances: Some("Laid off in March; interviewing weekly.".to_string()),
        reason_for_applying: Some("Need help covering rent until I start a new job.".to_string()),
    };
    match wizard.submit_situation(situation).await {
        Ok(receipt) => {
            println!(
                "  submitted as {} at {}",
                receipt.id,
                receipt.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            let status = wizard.status();
            println!(
                "\nFinal state: {} | draft retained: {}",
                status.label, status.has_draft
            );
        }
        Err(err) => println!("  Submission failed: {err}"),
    }

    Ok(())
}

fn pick_location(catalog: &LocationCatalog) -> Option<(LocationOption, LocationOption, CityOption)> {
    catalog.country_options().into_iter().find_map(|country| {
        catalog
            .state_options(country.id)
            .into_iter()
            .find_map(|state| {
                catalog
                    .city_options(country.id, state.id)
                    .into_iter()
                    .find(|city| matches!(city, CityOption::City { .. }))
                    .map(|city| (state, city))
            })
            .map(|(state, city)| (country, state, city))
    })
}

fn city_label(city: &CityOption) -> &str {
    match city {
        CityOption::City { label, .. } => label.as_str(),
        CityOption::NoneAvailable { label } => label,
    }
}

fn years_before(today: NaiveDate, years: u32) -> Option<NaiveDate> {
    today.checked_sub_months(Months::new(years * 12))
}
