use serde::Serialize;

/// Calling-code reference entry with the national number lengths the country
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialCodeEntry {
    pub iso_code: &'static str,
    pub dial_code: &'static str,
    pub display_name: &'static str,
    #[serde(skip)]
    pub min_national_digits: u8,
    #[serde(skip)]
    pub max_national_digits: u8,
}

const fn entry(
    iso_code: &'static str,
    dial_code: &'static str,
    display_name: &'static str,
    min_national_digits: u8,
    max_national_digits: u8,
) -> DialCodeEntry {
    DialCodeEntry {
        iso_code,
        dial_code,
        display_name,
        min_national_digits,
        max_national_digits,
    }
}

/// Ordered by display name; prefix inference walks this order.
pub const DIAL_CODES: &[DialCodeEntry] = &[
    entry("AU", "+61", "Australia", 9, 9),
    entry("BS", "+1242", "Bahamas", 7, 7),
    entry("BR", "+55", "Brazil", 10, 11),
    entry("CA", "+1", "Canada", 7, 10),
    entry("CN", "+86", "China", 10, 11),
    entry("EG", "+20", "Egypt", 9, 10),
    entry("FR", "+33", "France", 9, 9),
    entry("DE", "+49", "Germany", 6, 11),
    entry("IN", "+91", "India", 10, 10),
    entry("JM", "+1876", "Jamaica", 7, 7),
    entry("JP", "+81", "Japan", 9, 10),
    entry("JO", "+962", "Jordan", 8, 9),
    entry("KE", "+254", "Kenya", 9, 9),
    entry("MX", "+52", "Mexico", 10, 10),
    entry("NG", "+234", "Nigeria", 8, 10),
    entry("PK", "+92", "Pakistan", 9, 10),
    entry("SA", "+966", "Saudi Arabia", 9, 9),
    entry("ZA", "+27", "South Africa", 9, 9),
    entry("ES", "+34", "Spain", 9, 9),
    entry("AE", "+971", "United Arab Emirates", 8, 9),
    entry("GB", "+44", "United Kingdom", 9, 10),
    entry("US", "+1", "United States", 7, 10),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_sorted_by_display_name() {
        let names: Vec<_> = DIAL_CODES.iter().map(|entry| entry.display_name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn iso_codes_are_unique_and_dial_codes_well_formed() {
        let mut seen = HashSet::new();
        for entry in DIAL_CODES {
            assert!(seen.insert(entry.iso_code), "duplicate {}", entry.iso_code);
            assert!(entry.dial_code.starts_with('+'));
            assert!(entry.dial_code[1..].chars().all(|c| c.is_ascii_digit()));
            assert!(entry.min_national_digits <= entry.max_national_digits);
        }
    }
}
