//! # Response extraction
//!
//! Turns a raw, loosely formatted answer such as
//!
//! ```text
//! Year: 2018
//! BodyType: Compact Hatchback vehicle
//! Cost: $24,000 - MSRP varies, dealer invoice $22,500
//! Length: 182.3 inches
//! Drive: front-wheel drive
//! ```
//!
//! into a [`Specification`] of normalized values.
//!
//! Each [`SpecField`] has one [`FieldRule`]: a line-oriented label pattern and a
//! normalization function. The rules are compiled once and walked in field order.
//! Fields whose label line is missing are simply absent from the output; extraction
//! never fails.

use crate::models::{CarKey, SearchResult, SpecField, Specification};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Marker the prompt asks the model to use for unavailable data.
pub const NOT_AVAILABLE: &str = "N/A";

/// Label pattern plus normalizer for one field.
pub struct FieldRule {
    pub field: SpecField,
    pattern: Regex,
    normalize: fn(&str) -> String,
}

impl FieldRule {
    fn new(field: SpecField, normalize: fn(&str) -> String) -> Self {
        FieldRule {
            field,
            pattern: label_pattern(field.label()),
            normalize,
        }
    }

    /// Raw value captured after `Label:` on the first matching line.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Capture and normalize. `N/A` anywhere in the value wins over normalization.
    pub fn apply(&self, text: &str) -> Option<String> {
        let value = self.capture(text)?;
        if value.contains(NOT_AVAILABLE) {
            return Some(NOT_AVAILABLE.to_string());
        }
        Some((self.normalize)(value))
    }
}

/// `Label: value` at the start of a line, case-insensitive. Tolerates leading
/// whitespace, a list bullet and markdown bold around the label. The value never
/// crosses a line break and trailing whitespace is dropped.
fn label_pattern(label: &str) -> Regex {
    let pattern = format!(
        r"(?im)^[ \t]*(?:[-*+][ \t]+)?(?:\*\*)?{}(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*(.*?)[ \t\r]*$",
        regex::escape(label)
    );
    Regex::new(&pattern).expect("invalid label pattern")
}

static RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    SpecField::ALL
        .into_iter()
        .map(|field| {
            let normalize: fn(&str) -> String = match field {
                SpecField::Year => normalize_year,
                SpecField::Length
                | SpecField::CargoRear
                | SpecField::CargoTotal
                | SpecField::MpgCity
                | SpecField::MpgHwy
                | SpecField::MpgCombo => normalize_number,
                SpecField::Cost => normalize_cost,
                SpecField::BodyType => normalize_body_type,
                SpecField::FuelType => normalize_fuel_type,
                SpecField::Drive => normalize_drive,
                SpecField::Reliability => normalize_reliability,
            };
            FieldRule::new(field, normalize)
        })
        .collect()
});

static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("invalid YEAR pattern"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("invalid NUMBER pattern"));
static DOLLARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9,]+)").expect("invalid DOLLARS pattern"));
static DRIVE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(FWD|RWD|AWD|4WD)\b").expect("invalid DRIVE_TOKEN pattern")
});
static RATING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:out of|/)\s*\d+").expect("invalid RATING pattern")
});

const BODY_TYPES: [(&str, &str); 7] = [
    ("hatchback", "Hatchback"),
    ("sedan", "Sedan"),
    ("suv", "SUV"),
    ("crossover", "Crossover"),
    ("wagon", "Wagon"),
    ("coupe", "Coupe"),
    ("convertible", "Convertible"),
];

const FUEL_TYPES: [(&[&str], &str); 4] = [
    (&["gasoline", "gas"], "Gasoline"),
    (&["hybrid"], "Hybrid"),
    (&["electric"], "Electric"),
    (&["diesel"], "Diesel"),
];

const DRIVE_TYPES: [(&[&str], &str); 4] = [
    (&["fwd", "front"], "FWD"),
    (&["rwd", "rear"], "RWD"),
    (&["awd", "all"], "AWD"),
    (&["4wd", "four"], "4WD"),
];

/// The compiled rule table, in field order.
pub fn rules() -> &'static [FieldRule] {
    &RULES
}

/// Extract every field that has a label line in `response`.
///
/// `None` or empty input yields an empty specification.
pub fn extract_specs(response: Option<&str>) -> Specification {
    let mut specs = Specification::new();
    let Some(text) = response.filter(|t| !t.is_empty()) else {
        return specs;
    };

    for rule in rules() {
        if let Some(value) = rule.apply(text) {
            debug!("{}: {:?}", rule.field, value);
            specs.insert(rule.field, value);
        }
    }

    specs
}

/// Extract a specification for every search result, keyed by `(make, model)`.
///
/// When the same car appears more than once, the later entry wins.
pub fn extract_all(results: &[SearchResult]) -> HashMap<CarKey, Specification> {
    let mut extracted = HashMap::with_capacity(results.len());
    for result in results {
        let specs = extract_specs(result.response.as_deref());
        info!(
            "Extracted {} specs for {} {}",
            specs.len(),
            result.make,
            result.model
        );
        extracted.insert(result.key(), specs);
    }
    extracted
}

fn normalize_year(value: &str) -> String {
    YEAR.find(value)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.to_string())
}

fn normalize_number(value: &str) -> String {
    NUMBER
        .find(value)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.to_string())
}

fn normalize_cost(value: &str) -> String {
    let amounts: Vec<&str> = DOLLARS
        .captures_iter(value)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    match amounts.as_slice() {
        [] => value.to_string(),
        [only] => format!("${only}"),
        [first, .., last] => format!("${first} - ${last}"),
    }
}

fn normalize_body_type(value: &str) -> String {
    let lower = value.to_lowercase();
    BODY_TYPES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| first_word_title(value))
}

fn normalize_fuel_type(value: &str) -> String {
    let lower = value.to_lowercase();
    FUEL_TYPES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| first_word_title(value))
}

fn normalize_drive(value: &str) -> String {
    let lower = value.to_lowercase();
    if let Some((_, canonical)) = DRIVE_TYPES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
    {
        return canonical.to_string();
    }

    DRIVE_TOKEN
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_else(|| value.to_string())
}

fn normalize_reliability(value: &str) -> String {
    RATING
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("{}/5", m.as_str()))
        .unwrap_or_else(|| value.to_string())
}

/// First whitespace-delimited word, title-cased; the empty string stays empty.
fn first_word_title(value: &str) -> String {
    value
        .split_whitespace()
        .next()
        .map(title_case)
        .unwrap_or_default()
}

/// Upper-case a letter that follows a non-letter, lower-case the rest
/// (`"plug-in"` → `"Plug-In"`).
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_is_alpha = false;
    for c in word.chars() {
        if prev_is_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_alpha = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(field: SpecField, text: &str) -> Option<String> {
        extract_specs(Some(text)).remove(&field)
    }

    #[test]
    fn test_absent_or_empty_response_is_empty() {
        assert!(extract_specs(None).is_empty());
        assert!(extract_specs(Some("")).is_empty());
        assert!(extract_specs(Some("I could not find that car.")).is_empty());
    }

    #[test]
    fn test_numeric_field_takes_first_number() {
        assert_eq!(
            one(SpecField::Length, "Length: 182.3 inches"),
            Some("182.3".to_string())
        );
        assert_eq!(
            one(SpecField::MpgCombo, "MpgCombo: about 31 mpg (28-34)"),
            Some("31".to_string())
        );
        assert_eq!(
            one(SpecField::CargoRear, "CargoRear: unknown"),
            Some("unknown".to_string())
        );
    }

    #[test]
    fn test_cost_range_uses_first_and_last_amount() {
        assert_eq!(
            one(
                SpecField::Cost,
                "Cost: $24,000 - MSRP varies, dealer invoice $22,500"
            ),
            Some("$24,000 - $22,500".to_string())
        );
        assert_eq!(
            one(SpecField::Cost, "Cost: $18,000 to $21,000, or $19,500 used"),
            Some("$18,000 - $19,500".to_string())
        );
        assert_eq!(
            one(SpecField::Cost, "Cost: starts at $19,990 MSRP"),
            Some("$19,990".to_string())
        );
        assert_eq!(
            one(SpecField::Cost, "Cost: varies by trim"),
            Some("varies by trim".to_string())
        );
    }

    #[test]
    fn test_body_type_priority_and_fallback() {
        assert_eq!(
            one(SpecField::BodyType, "BodyType: Compact Hatchback vehicle"),
            Some("Hatchback".to_string())
        );
        // Hatchback beats Sedan regardless of position.
        assert_eq!(
            one(SpecField::BodyType, "BodyType: sedan or hatchback"),
            Some("Hatchback".to_string())
        );
        assert_eq!(
            one(SpecField::BodyType, "BodyType: minivan with sliding doors"),
            Some("Minivan".to_string())
        );
        assert_eq!(
            one(SpecField::BodyType, "BodyType: PICKUP truck"),
            Some("Pickup".to_string())
        );
    }

    #[test]
    fn test_fuel_type_order() {
        assert_eq!(
            one(SpecField::FuelType, "FuelType: Regular unleaded gasoline"),
            Some("Gasoline".to_string())
        );
        // "gas" is checked before "hybrid".
        assert_eq!(
            one(SpecField::FuelType, "FuelType: gas-electric hybrid"),
            Some("Gasoline".to_string())
        );
        assert_eq!(
            one(SpecField::FuelType, "FuelType: Hybrid"),
            Some("Hybrid".to_string())
        );
        assert_eq!(
            one(SpecField::FuelType, "FuelType: plug-in"),
            Some("Plug-In".to_string())
        );
    }

    #[test]
    fn test_drive_normalization() {
        assert_eq!(
            one(SpecField::Drive, "Drive: front-wheel drive"),
            Some("FWD".to_string())
        );
        assert_eq!(
            one(SpecField::Drive, "Drive: Rear wheel"),
            Some("RWD".to_string())
        );
        assert_eq!(
            one(SpecField::Drive, "Drive: all-wheel drive"),
            Some("AWD".to_string())
        );
        assert_eq!(
            one(SpecField::Drive, "Drive: 4WD"),
            Some("4WD".to_string())
        );
        assert_eq!(
            one(SpecField::Drive, "Drive: chain driven"),
            Some("chain driven".to_string())
        );
    }

    #[test]
    fn test_year_and_reliability() {
        assert_eq!(
            one(SpecField::Year, "Year: Model year 2018 (refresh)"),
            Some("2018".to_string())
        );
        assert_eq!(
            one(SpecField::Year, "Year: XXXX"),
            Some("XXXX".to_string())
        );
        assert_eq!(
            one(SpecField::Reliability, "Reliability: 4.5 out of 5 (KBB)"),
            Some("4.5/5".to_string())
        );
        assert_eq!(
            one(SpecField::Reliability, "Reliability: 82/100"),
            Some("82/5".to_string())
        );
        assert_eq!(
            one(SpecField::Reliability, "Reliability: above average"),
            Some("above average".to_string())
        );
    }

    #[test]
    fn test_not_available_bypasses_normalization() {
        let text = "Length: N/A (not published)\nCost: $20,000 or N/A\nDrive: front N/A";
        let specs = extract_specs(Some(text));
        assert_eq!(specs.get(&SpecField::Length).map(String::as_str), Some("N/A"));
        assert_eq!(specs.get(&SpecField::Cost).map(String::as_str), Some("N/A"));
        assert_eq!(specs.get(&SpecField::Drive).map(String::as_str), Some("N/A"));
    }

    #[test]
    fn test_empty_value_is_found_and_stays_on_its_line() {
        let text = "Year:\nLength: 170.1\nBodyType:   \r\nFuelType: Diesel";
        let specs = extract_specs(Some(text));
        assert_eq!(specs.get(&SpecField::Year).map(String::as_str), Some(""));
        assert_eq!(specs.get(&SpecField::BodyType).map(String::as_str), Some(""));
        assert_eq!(specs.get(&SpecField::Length).map(String::as_str), Some("170.1"));
        assert_eq!(specs.get(&SpecField::FuelType).map(String::as_str), Some("Diesel"));
        assert_eq!(specs.len(), 4);
    }

    #[test]
    fn test_label_matching_is_line_oriented_and_case_insensitive() {
        let text = "Here is what I found:\n\
                    - **length:** 175.6 in\n\
                    * MPGCITY: 30\n\
                    Model year: 2016\n\
                    CargoTotal : 48.0 cu ft  \n";
        let specs = extract_specs(Some(text));
        assert_eq!(specs.get(&SpecField::Length).map(String::as_str), Some("175.6"));
        assert_eq!(specs.get(&SpecField::MpgCity).map(String::as_str), Some("30"));
        assert_eq!(specs.get(&SpecField::CargoTotal).map(String::as_str), Some("48.0"));
        // "Model year:" does not start with the Year label.
        assert!(!specs.contains_key(&SpecField::Year));
    }

    #[test]
    fn test_first_label_line_wins() {
        let text = "MpgHwy: 38\nMpgHwy: 41";
        assert_eq!(one(SpecField::MpgHwy, text), Some("38".to_string()));
    }

    #[test]
    fn test_full_answer() {
        let text = "\
Year: 2018
BodyType: Hatchback
Cost: $16,190 - $21,520
Length: 160.0 inches
CargoRear: 16.6 cu ft
CargoTotal: 52.7 cu ft
MpgCity: 33
MpgHwy: 40
MpgCombo: 36
FuelType: Gasoline
Drive: FWD
Reliability: 4.5 out of 5
";
        let specs = extract_specs(Some(text));
        assert_eq!(specs.len(), SpecField::ALL.len());
        assert_eq!(specs[&SpecField::Cost], "$16,190 - $21,520");
        assert_eq!(specs[&SpecField::CargoTotal], "52.7");
        assert_eq!(specs[&SpecField::Reliability], "4.5/5");
    }

    #[test]
    fn test_extract_all_later_duplicate_wins() {
        let results = vec![
            SearchResult {
                make: "Kia".into(),
                model: "Soul".into(),
                response: Some("Length: 163.0".into()),
            },
            SearchResult {
                make: "Honda".into(),
                model: "Fit".into(),
                response: None,
            },
            SearchResult {
                make: "Kia".into(),
                model: "Soul".into(),
                response: Some("Length: 165.2".into()),
            },
        ];
        let extracted = extract_all(&results);
        assert_eq!(extracted.len(), 2);
        let soul = &extracted[&("Kia".to_string(), "Soul".to_string())];
        assert_eq!(soul[&SpecField::Length], "165.2");
        assert!(extracted[&("Honda".to_string(), "Fit".to_string())].is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("compact"), "Compact");
        assert_eq!(title_case("MINI-VAN"), "Mini-Van");
        assert_eq!(title_case(""), "");
    }
}
