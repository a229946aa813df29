use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a country, state, or city inside the location catalog.
pub type LocationId = u64;

/// A cascading select value. `Unset` never collides with a real identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum Selection<T> {
    Unset,
    Selected(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Selection<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Unset => None,
            Self::Selected(value) => Some(value),
        }
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Self::Selected(inner),
            None => Self::Unset,
        }
    }
}

/// City value once a state is chosen. `NoneAvailable` is the valid choice for
/// states that carry no cities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityChoice {
    City(LocationId),
    NoneAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const fn ordered() -> [Self; 3] {
        [Self::Male, Self::Female, Self::Other]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Single, Self::Married, Self::Divorced, Self::Widowed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
            Self::Divorced => "Divorced",
            Self::Widowed => "Widowed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentStatus {
    Employed,
    Unemployed,
    SelfEmployed,
    Student,
    Retired,
}

impl EmploymentStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Employed,
            Self::Unemployed,
            Self::SelfEmployed,
            Self::Student,
            Self::Retired,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Employed => "Employed",
            Self::Unemployed => "Unemployed",
            Self::SelfEmployed => "Self-employed",
            Self::Student => "Student",
            Self::Retired => "Retired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingStatus {
    Rent,
    Own,
    Family,
    Other,
}

impl HousingStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Rent, Self::Own, Self::Family, Self::Other]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Own => "Own",
            Self::Family => "Family",
            Self::Other => "Other",
        }
    }
}

/// Personal details as edited on the first step. Every field may be missing
/// until validation promotes the form into [`PersonalDetails`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Selection<LocationId>,
    #[serde(default)]
    pub state: Selection<LocationId>,
    #[serde(default)]
    pub city: Selection<CityChoice>,
    /// ISO code of the selected dial-code entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Step1Form {
    /// Pick a country. A different country clears the dependent state and city.
    pub fn select_country(&mut self, country: Selection<LocationId>) {
        if self.country != country {
            self.country = country;
            self.state = Selection::Unset;
            self.city = Selection::Unset;
        }
    }

    /// Pick a state. A different state clears the dependent city.
    pub fn select_state(&mut self, state: Selection<LocationId>) {
        if self.state != state {
            self.state = state;
            self.city = Selection::Unset;
        }
    }

    pub fn select_city(&mut self, city: Selection<CityChoice>) {
        self.city = city;
    }
}

/// Family and financial answers from the second step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing_status: Option<HousingStatus>,
}

/// Free-text narratives from the third step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step3Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_financial_situation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_circumstances: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_applying: Option<String>,
}

impl Step3Form {
    pub fn field(&self, field: NarrativeField) -> Option<&str> {
        match field {
            NarrativeField::CurrentFinancialSituation => self.current_financial_situation.as_deref(),
            NarrativeField::EmploymentCircumstances => self.employment_circumstances.as_deref(),
            NarrativeField::ReasonForApplying => self.reason_for_applying.as_deref(),
        }
    }

    pub fn set_field(&mut self, field: NarrativeField, text: String) {
        let slot = match field {
            NarrativeField::CurrentFinancialSituation => &mut self.current_financial_situation,
            NarrativeField::EmploymentCircumstances => &mut self.employment_circumstances,
            NarrativeField::ReasonForApplying => &mut self.reason_for_applying,
        };
        *slot = Some(text);
    }
}

/// The narrative fields on the situation step, each eligible for assist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NarrativeField {
    CurrentFinancialSituation,
    EmploymentCircumstances,
    ReasonForApplying,
}

impl NarrativeField {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::CurrentFinancialSituation,
            Self::EmploymentCircumstances,
            Self::ReasonForApplying,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::CurrentFinancialSituation => "currentFinancialSituation",
            Self::EmploymentCircumstances => "employmentCircumstances",
            Self::ReasonForApplying => "reasonForApplying",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CurrentFinancialSituation => "Current Financial Situation",
            Self::EmploymentCircumstances => "Employment Circumstances",
            Self::ReasonForApplying => "Reason for Applying",
        }
    }
}

/// Validated personal details. `phone` holds local digits only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub name: String,
    pub national_id: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub country: LocationId,
    pub state: LocationId,
    pub city: CityChoice,
    pub country_code: String,
    pub phone: String,
    pub email: String,
}

/// Validated family and financial answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyFinancial {
    pub marital_status: MaritalStatus,
    pub dependents: u32,
    pub employment_status: EmploymentStatus,
    pub monthly_income: f64,
    pub housing_status: HousingStatus,
}

/// Validated narratives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Situation {
    pub current_financial_situation: String,
    pub employment_circumstances: String,
    pub reason_for_applying: String,
}

/// In-progress application spanning all three steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplicationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step1: Option<Step1Form>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step2: Option<Step2Form>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step3: Option<Step3Form>,
}

impl ApplicationDraft {
    pub fn is_empty(&self) -> bool {
        self.step1.is_none() && self.step2.is_none() && self.step3.is_none()
    }
}

/// Replacement for one step of the draft. Merging swaps the whole sub-object.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAnswers {
    Personal(Step1Form),
    Household(Step2Form),
    Situation(Step3Form),
}

impl StepAnswers {
    pub fn apply(self, draft: &mut ApplicationDraft) {
        match self {
            Self::Personal(form) => draft.step1 = Some(form),
            Self::Household(form) => draft.step2 = Some(form),
            Self::Situation(form) => draft.step3 = Some(form),
        }
    }
}
