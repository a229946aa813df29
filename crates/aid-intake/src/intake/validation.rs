//! Per-field required/format rules for each wizard step.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;

use super::domain::{
    CityChoice, FamilyFinancial, PersonalDetails, Selection, Situation, Step1Form, Step2Form,
    Step3Form,
};
use super::locations::LocationCatalog;
use super::phone::{PhoneError, PhoneNormalizer};

pub const MINIMUM_AGE_YEARS: i32 = 18;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    Required,
    Underage,
    InvalidDate,
    InvalidPhone,
    MissingCountryCode,
    InvalidEmail,
    Negative,
    InvalidNumber,
    UnknownOption,
}

impl FieldError {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Required => "This field is required",
            Self::Underage => "Applicant must be at least 18 years old",
            Self::InvalidDate => "Date of birth cannot be in the future",
            Self::InvalidPhone => "Invalid phone number for the selected country",
            Self::MissingCountryCode => "Select a country calling code first",
            Self::InvalidEmail => "Invalid email address",
            Self::Negative => "Value cannot be negative",
            Self::InvalidNumber => "Value is out of range",
            Self::UnknownOption => "Selection is not available",
        }
    }
}

impl From<PhoneError> for FieldError {
    fn from(value: PhoneError) -> Self {
        match value {
            PhoneError::MissingCountryCode => Self::MissingCountryCode,
            PhoneError::InvalidPhone => Self::InvalidPhone,
        }
    }
}

/// Field-level failures for one step, keyed by the form's field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, FieldError>,
}

impl ValidationErrors {
    pub fn insert(&mut self, field: &'static str, error: FieldError) {
        self.fields.entry(field).or_insert(error);
    }

    pub fn get(&self, field: &str) -> Option<FieldError> {
        self.fields.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldError)> + '_ {
        self.fields.iter().map(|(field, error)| (*field, *error))
    }

    fn into_result<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        build().ok_or(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .fields
            .iter()
            .map(|(field, error)| format!("{field}: {}", error.message()))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{rendered}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Completed years between `dob` and `today`; a birthday counts on the day.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = (today.month(), today.day()) < (dob.month(), dob.day());
    today.year() - dob.year() - i32::from(before_birthday)
}

pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
        .is_match(value)
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&String>,
) -> Option<String> {
    match value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty()) {
        Some(text) => Some(text.to_string()),
        None => {
            errors.insert(field, FieldError::Required);
            None
        }
    }
}

fn required<T: Copy>(errors: &mut ValidationErrors, field: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.insert(field, FieldError::Required);
    }
    value
}

/// Promote the personal details form. The returned phone is local digits only.
pub fn validate_personal(
    form: &Step1Form,
    catalog: &LocationCatalog,
    phones: &PhoneNormalizer,
    today: NaiveDate,
) -> Result<PersonalDetails, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required_text(&mut errors, "name", form.name.as_ref());
    let national_id = required_text(&mut errors, "nationalId", form.national_id.as_ref());
    let address = required_text(&mut errors, "address", form.address.as_ref());
    let gender = required(&mut errors, "gender", form.gender);

    let dob = required(&mut errors, "dob", form.dob).filter(|dob| {
        if *dob > today {
            errors.insert("dob", FieldError::InvalidDate);
            false
        } else if age_on(*dob, today) < MINIMUM_AGE_YEARS {
            errors.insert("dob", FieldError::Underage);
            false
        } else {
            true
        }
    });

    let email = required_text(&mut errors, "email", form.email.as_ref()).filter(|email| {
        let valid = is_valid_email(email);
        if !valid {
            errors.insert("email", FieldError::InvalidEmail);
        }
        valid
    });

    let country_code = required_text(&mut errors, "countryCode", form.country_code.as_ref());
    let phone = required_text(&mut errors, "phone", form.phone.as_ref()).filter(|phone| {
        match phones.validate(phone, country_code.as_deref()) {
            Ok(()) => true,
            Err(err) => {
                errors.insert("phone", err.into());
                false
            }
        }
    });

    let (country, state, city) = validate_location(&mut errors, form, catalog);

    errors.into_result(|| {
        Some(PersonalDetails {
            name: name?,
            national_id: national_id?,
            dob: dob?,
            gender: gender?,
            address: address?,
            country: country?,
            state: state?,
            city: city?,
            country_code: country_code?,
            phone: phone?,
            email: email?,
        })
    })
}

fn validate_location(
    errors: &mut ValidationErrors,
    form: &Step1Form,
    catalog: &LocationCatalog,
) -> (Option<u64>, Option<u64>, Option<CityChoice>) {
    let country = match form.country {
        Selection::Unset => {
            errors.insert("country", FieldError::Required);
            return (None, None, None);
        }
        Selection::Selected(id) if catalog.find_country(id).is_none() => {
            errors.insert("country", FieldError::UnknownOption);
            return (None, None, None);
        }
        Selection::Selected(id) => id,
    };

    let state = match form.state {
        Selection::Unset => {
            errors.insert("state", FieldError::Required);
            return (Some(country), None, None);
        }
        Selection::Selected(id) => match catalog.find_state(country, id) {
            Some(state) => state,
            None => {
                errors.insert("state", FieldError::UnknownOption);
                return (Some(country), None, None);
            }
        },
    };

    let city = if state.cities.is_empty() {
        match form.city {
            Selection::Unset | Selection::Selected(CityChoice::NoneAvailable) => {
                Some(CityChoice::NoneAvailable)
            }
            Selection::Selected(CityChoice::City(_)) => {
                errors.insert("city", FieldError::UnknownOption);
                None
            }
        }
    } else {
        match form.city {
            Selection::Unset => {
                errors.insert("city", FieldError::Required);
                None
            }
            Selection::Selected(CityChoice::City(id))
                if catalog.find_city(country, state.id, id).is_some() =>
            {
                Some(CityChoice::City(id))
            }
            Selection::Selected(_) => {
                errors.insert("city", FieldError::UnknownOption);
                None
            }
        }
    };

    (Some(country), Some(state.id), city)
}

pub fn validate_household(form: &Step2Form) -> Result<FamilyFinancial, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let marital_status = required(&mut errors, "maritalStatus", form.marital_status);
    let employment_status = required(&mut errors, "employmentStatus", form.employment_status);
    let housing_status = required(&mut errors, "housingStatus", form.housing_status);

    let dependents = required(&mut errors, "dependents", form.dependents).and_then(|count| {
        if count < 0 {
            errors.insert("dependents", FieldError::Negative);
            return None;
        }
        let converted = u32::try_from(count).ok();
        if converted.is_none() {
            errors.insert("dependents", FieldError::InvalidNumber);
        }
        converted
    });

    let monthly_income =
        required(&mut errors, "monthlyIncome", form.monthly_income).filter(|income| {
            if !income.is_finite() {
                errors.insert("monthlyIncome", FieldError::InvalidNumber);
                false
            } else if *income < 0.0 {
                errors.insert("monthlyIncome", FieldError::Negative);
                false
            } else {
                true
            }
        });

    errors.into_result(|| {
        Some(FamilyFinancial {
            marital_status: marital_status?,
            dependents: dependents?,
            employment_status: employment_status?,
            monthly_income: monthly_income?,
            housing_status: housing_status?,
        })
    })
}

pub fn validate_situation(form: &Step3Form) -> Result<Situation, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let current_financial_situation = required_text(
        &mut errors,
        "currentFinancialSituation",
        form.current_financial_situation.as_ref(),
    );
    let employment_circumstances = required_text(
        &mut errors,
        "employmentCircumstances",
        form.employment_circumstances.as_ref(),
    );
    let reason_for_applying = required_text(
        &mut errors,
        "reasonForApplying",
        form.reason_for_applying.as_ref(),
    );

    errors.into_result(|| {
        Some(Situation {
            current_financial_situation: current_financial_situation?,
            employment_circumstances: employment_circumstances?,
            reason_for_applying: reason_for_applying?,
        })
    })
}
