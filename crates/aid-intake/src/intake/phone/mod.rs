//! Dial-code reconciliation for the phone field on the personal details step.
//!
//! The edit form holds the local number only; the stored draft and the
//! submission carry `dial_code ++ local`.

mod dial_codes;

pub use dial_codes::{DialCodeEntry, DIAL_CODES};

/// E.164 caps a full number at fifteen digits.
const E164_MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("a country calling code must be selected")]
    MissingCountryCode,
    #[error("phone number is not valid for the selected country")]
    InvalidPhone,
}

/// Validates, combines, and splits phone numbers against a dial-code table.
#[derive(Debug, Clone, Copy)]
pub struct PhoneNormalizer {
    table: &'static [DialCodeEntry],
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(DIAL_CODES)
    }
}

impl PhoneNormalizer {
    pub fn new(table: &'static [DialCodeEntry]) -> Self {
        Self { table }
    }

    pub fn entries(&self) -> &'static [DialCodeEntry] {
        self.table
    }

    pub fn lookup(&self, iso_code: &str) -> Option<&'static DialCodeEntry> {
        let iso_code = iso_code.trim();
        self.table
            .iter()
            .find(|entry| entry.iso_code.eq_ignore_ascii_case(iso_code))
    }

    /// Check a dial-code-free local number against the selected country.
    pub fn validate(&self, local_number: &str, iso_code: Option<&str>) -> Result<(), PhoneError> {
        let iso_code = iso_code
            .filter(|code| !code.trim().is_empty())
            .ok_or(PhoneError::MissingCountryCode)?;
        let entry = self.lookup(iso_code).ok_or(PhoneError::InvalidPhone)?;

        if local_number.starts_with('+') || local_number.starts_with(entry.dial_code) {
            return Err(PhoneError::InvalidPhone);
        }

        if is_valid_for(entry, &format!("{}{}", entry.dial_code, local_number)) {
            Ok(())
        } else {
            Err(PhoneError::InvalidPhone)
        }
    }

    /// Canonical stored form. Unknown countries leave the number untouched.
    pub fn combine(&self, local_number: &str, iso_code: &str) -> String {
        match self.lookup(iso_code) {
            Some(entry) => format!("{}{}", entry.dial_code, local_number),
            None => local_number.to_string(),
        }
    }

    /// Strip the country's dial code. Numbers without that prefix come back as-is.
    pub fn split(&self, full_number: &str, iso_code: &str) -> String {
        self.lookup(iso_code)
            .and_then(|entry| full_number.strip_prefix(entry.dial_code))
            .unwrap_or(full_number)
            .to_string()
    }

    /// Split a number whose country was never recorded. The first dial code in
    /// table order that prefixes the number wins, so "+1242..." resolves to
    /// whichever of Bahamas, Canada, or United States sorts first.
    pub fn split_inferring(&self, full_number: &str) -> (Option<&'static DialCodeEntry>, String) {
        for entry in self.table {
            if let Some(local) = full_number.strip_prefix(entry.dial_code) {
                return (Some(entry), local.to_string());
            }
        }
        (None, full_number.to_string())
    }
}

fn is_valid_for(entry: &DialCodeEntry, full_number: &str) -> bool {
    let Some(national) = full_number.strip_prefix(entry.dial_code) else {
        return false;
    };

    if national.is_empty() || !national.bytes().all(|byte| byte.is_ascii_digit()) {
        return false;
    }
    if national.starts_with('0') {
        return false;
    }

    let length = national.len();
    let country_digits = entry.dial_code.len() - 1;
    length >= usize::from(entry.min_national_digits)
        && length <= usize::from(entry.max_national_digits)
        && country_digits + length <= E164_MAX_DIGITS
}
