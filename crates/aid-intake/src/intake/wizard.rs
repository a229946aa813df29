use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::assist::{AssistError, AssistRequester, AssistSuggestion};
use super::clock::{Clock, SystemClock};
use super::domain::{
    ApplicationDraft, FamilyFinancial, LocationId, NarrativeField, PersonalDetails,
    Selection, Situation, Step1Form, Step2Form, Step3Form, StepAnswers,
};
use super::draft::FormState;
use super::locations::{CityOption, LocationCatalog, LocationOption};
use super::phone::{DialCodeEntry, PhoneNormalizer};
use super::submission::{SubmissionError, SubmissionGateway, SubmissionReceipt};
use super::validation::{validate_household, validate_personal, validate_situation, ValidationErrors};

/// Position in the linear three-step flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalDetails,
    FamilyFinancial,
    Situation,
    Submitted,
}

impl WizardStep {
    pub const TOTAL: u8 = 3;

    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalDetails => "Personal Details",
            Self::FamilyFinancial => "Family & Financial",
            Self::Situation => "Situation",
            Self::Submitted => "Submitted",
        }
    }

    /// One-based step number; `Submitted` reports one past the last step.
    pub const fn number(self) -> u8 {
        match self {
            Self::PersonalDetails => 1,
            Self::FamilyFinancial => 2,
            Self::Situation => 3,
            Self::Submitted => 4,
        }
    }

    const fn previous(self) -> Option<Self> {
        match self {
            Self::FamilyFinancial => Some(Self::PersonalDetails),
            Self::Situation => Some(Self::FamilyFinancial),
            Self::PersonalDetails | Self::Submitted => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("cannot submit {} while on {}", .attempted.label(), .current.label())]
    OutOfOrder {
        current: WizardStep,
        attempted: WizardStep,
    },
    #[error("there is no step before {}", .0.label())]
    NoPreviousStep(WizardStep),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStatus {
    pub step: WizardStep,
    pub step_number: u8,
    pub total_steps: u8,
    pub label: &'static str,
    pub has_draft: bool,
    pub assist_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubmissionReceipt>,
}

/// Drives one applicant through the three steps and the final submission.
pub struct WizardController {
    form: FormState,
    catalog: Arc<LocationCatalog>,
    location_banner: Option<String>,
    phones: PhoneNormalizer,
    clock: Arc<dyn Clock>,
    gateway: Arc<dyn SubmissionGateway>,
    assist: Option<Arc<AssistRequester>>,
    step: WizardStep,
    receipt: Option<SubmissionReceipt>,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("step", &self.step)
            .field("form", &self.form)
            .field("location_banner", &self.location_banner)
            .finish_non_exhaustive()
    }
}

impl WizardController {
    pub fn new(
        form: FormState,
        catalog: Arc<LocationCatalog>,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Self {
        Self {
            form,
            catalog,
            location_banner: None,
            phones: PhoneNormalizer::default(),
            clock: Arc::new(SystemClock),
            gateway,
            assist: None,
            step: WizardStep::PersonalDetails,
            receipt: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_assist(mut self, assist: Arc<AssistRequester>) -> Self {
        self.assist = Some(assist);
        self
    }

    pub fn with_phone_normalizer(mut self, phones: PhoneNormalizer) -> Self {
        self.phones = phones;
        self
    }

    /// Message shown above the location selects, e.g. when the dataset failed
    /// to load and the catalog is empty.
    pub fn with_location_banner(mut self, banner: impl Into<String>) -> Self {
        self.location_banner = Some(banner.into());
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ApplicationDraft {
        self.form.draft()
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    pub fn status(&self) -> WizardStatus {
        WizardStatus {
            step: self.step,
            step_number: self.step.number(),
            total_steps: WizardStep::TOTAL,
            label: self.step.label(),
            has_draft: !self.form.draft().is_empty(),
            assist_available: self.assist.is_some(),
            location_banner: self.location_banner.clone(),
            receipt: self.receipt.clone(),
        }
    }

    fn expect_step(&self, attempted: WizardStep) -> Result<(), WizardError> {
        if self.step == attempted {
            Ok(())
        } else {
            Err(WizardError::OutOfOrder {
                current: self.step,
                attempted,
            })
        }
    }

    fn advance(&mut self, next: WizardStep) {
        info!(from = self.step.label(), to = next.label(), "wizard advanced");
        self.step = next;
    }

    /// Validate and store step one. The draft keeps the combined phone number
    /// and the resolved city.
    pub fn submit_personal(&mut self, values: Step1Form) -> Result<PersonalDetails, WizardError> {
        self.expect_step(WizardStep::PersonalDetails)?;
        let details = validate_personal(&values, &self.catalog, &self.phones, self.clock.today())?;

        let stored = Step1Form {
            name: Some(details.name.clone()),
            national_id: Some(details.national_id.clone()),
            dob: Some(details.dob),
            gender: Some(details.gender),
            address: Some(details.address.clone()),
            country: Selection::Selected(details.country),
            state: Selection::Selected(details.state),
            city: Selection::Selected(details.city),
            country_code: Some(details.country_code.clone()),
            phone: Some(self.phones.combine(&details.phone, &details.country_code)),
            email: Some(details.email.clone()),
        };
        self.form.merge(StepAnswers::Personal(stored));
        self.advance(WizardStep::FamilyFinancial);
        Ok(details)
    }

    pub fn submit_household(&mut self, values: Step2Form) -> Result<FamilyFinancial, WizardError> {
        self.expect_step(WizardStep::FamilyFinancial)?;
        let household = validate_household(&values)?;

        self.form.merge(StepAnswers::Household(Step2Form {
            marital_status: Some(household.marital_status),
            dependents: Some(i64::from(household.dependents)),
            employment_status: Some(household.employment_status),
            monthly_income: Some(household.monthly_income),
            housing_status: Some(household.housing_status),
        }));
        self.advance(WizardStep::Situation);
        Ok(household)
    }

    /// Validate step three, then hand the merged draft to the gateway. The
    /// draft is cleared only once the gateway accepts it.
    pub async fn submit_situation(
        &mut self,
        values: Step3Form,
    ) -> Result<SubmissionReceipt, WizardError> {
        self.expect_step(WizardStep::Situation)?;
        let situation: Situation = validate_situation(&values)?;

        self.form.merge(StepAnswers::Situation(Step3Form {
            current_financial_situation: Some(situation.current_financial_situation),
            employment_circumstances: Some(situation.employment_circumstances),
            reason_for_applying: Some(situation.reason_for_applying),
        }));

        let outcome = self.gateway.submit(self.form.draft()).await;
        match outcome {
            Ok(receipt) => {
                self.form.clear();
                self.receipt = Some(receipt.clone());
                self.advance(WizardStep::Submitted);
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "application submission failed");
                Err(err.into())
            }
        }
    }

    /// Step back without discarding anything already stored.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self
            .step
            .previous()
            .ok_or(WizardError::NoPreviousStep(self.step))?;
        self.step = previous;
        Ok(previous)
    }

    /// Begin another application after a completed one.
    pub fn start_new(&mut self) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Submitted)?;
        self.receipt = None;
        self.step = WizardStep::PersonalDetails;
        Ok(self.step)
    }

    /// Stored personal details as an edit form, phone reduced to local digits.
    /// A number saved without a country code gets one inferred from its prefix.
    pub fn personal_form(&self) -> Step1Form {
        let mut form = self.form.draft().step1.clone().unwrap_or_default();
        let Some(full) = form.phone.take() else {
            return form;
        };

        let known = form
            .country_code
            .as_deref()
            .and_then(|code| self.phones.lookup(code));
        let local = match known {
            Some(entry) => self.phones.split(&full, entry.iso_code),
            None => {
                let (entry, local) = self.phones.split_inferring(&full);
                if let Some(entry) = entry {
                    form.country_code = Some(entry.iso_code.to_string());
                }
                local
            }
        };
        form.phone = Some(local);
        form
    }

    pub fn household_form(&self) -> Step2Form {
        self.form.draft().step2.clone().unwrap_or_default()
    }

    pub fn situation_form(&self) -> Step3Form {
        self.form.draft().step3.clone().unwrap_or_default()
    }

    pub fn country_options(&self) -> Vec<LocationOption> {
        self.catalog.country_options()
    }

    pub fn state_options(&self, country: Selection<LocationId>) -> Vec<LocationOption> {
        match country {
            Selection::Selected(id) => self.catalog.state_options(id),
            Selection::Unset => Vec::new(),
        }
    }

    pub fn city_options(
        &self,
        country: Selection<LocationId>,
        state: Selection<LocationId>,
    ) -> Vec<CityOption> {
        match (country, state) {
            (Selection::Selected(country), Selection::Selected(state)) => {
                self.catalog.city_options(country, state)
            }
            _ => Vec::new(),
        }
    }

    pub fn dial_codes(&self) -> &'static [DialCodeEntry] {
        self.phones.entries()
    }

    /// Handle to the assist requester, so callers can await a suggestion
    /// without holding the controller.
    pub fn assist(&self) -> Option<Arc<AssistRequester>> {
        self.assist.clone()
    }

    pub async fn request_assist(
        &self,
        field: NarrativeField,
        current_text: &str,
    ) -> Result<AssistSuggestion, AssistError> {
        match &self.assist {
            Some(assist) => assist.suggest(field, current_text).await,
            None => Err(AssistError::RequestFailed {
                reason: "text assistance is not configured".to_string(),
            }),
        }
    }
}
