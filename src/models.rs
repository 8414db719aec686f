//! # Data models
//!
//! Plain data structures shared by every stage of the pipeline:
//!
//! - [`SpecField`]: the closed set of specification columns tracked per car.
//! - [`Specification`]: an ordered `SpecField → String` mapping, used both for the
//!   values stored in a table row and for the values extracted from a raw response.
//! - [`CarRecord`]: one row of the car table.
//! - [`SearchResult`]: one entry of the search results JSON file.
//!
//! All values are kept as text. Numeric columns are only parsed transiently by
//! [`crate::analyze`].

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// One named attribute of a car, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecField {
    Year,
    BodyType,
    Cost,
    Length,
    CargoRear,
    CargoTotal,
    MpgCity,
    MpgHwy,
    MpgCombo,
    FuelType,
    Drive,
    Reliability,
}

impl SpecField {
    /// Every field, in the order the table stores them.
    pub const ALL: [SpecField; 12] = [
        SpecField::Year,
        SpecField::BodyType,
        SpecField::Cost,
        SpecField::Length,
        SpecField::CargoRear,
        SpecField::CargoTotal,
        SpecField::MpgCity,
        SpecField::MpgHwy,
        SpecField::MpgCombo,
        SpecField::FuelType,
        SpecField::Drive,
        SpecField::Reliability,
    ];

    /// Column name in the car table, also the label used in `Field: value` answers.
    pub fn label(self) -> &'static str {
        match self {
            SpecField::Year => "Year",
            SpecField::BodyType => "BodyType",
            SpecField::Cost => "Cost",
            SpecField::Length => "Length",
            SpecField::CargoRear => "CargoRear",
            SpecField::CargoTotal => "CargoTotal",
            SpecField::MpgCity => "MpgCity",
            SpecField::MpgHwy => "MpgHwy",
            SpecField::MpgCombo => "MpgCombo",
            SpecField::FuelType => "FuelType",
            SpecField::Drive => "Drive",
            SpecField::Reliability => "Reliability",
        }
    }

    /// Reverse of [`SpecField::label`]; exact, case-sensitive column match.
    pub fn from_label(label: &str) -> Option<SpecField> {
        SpecField::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl fmt::Display for SpecField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field → normalized text value. May be partial or empty.
pub type Specification = BTreeMap<SpecField, String>;

/// Identity of a car: `(Make, Model)`.
pub type CarKey = (String, String);

/// One row of the car table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarRecord {
    pub make: String,
    pub model: String,
    /// Specification columns present in the row. Empty cells are kept as `""`.
    pub specs: Specification,
}

impl CarRecord {
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        CarRecord {
            make: make.into(),
            model: model.into(),
            specs: Specification::new(),
        }
    }

    /// Builder-style helper used mostly by tests and fixtures.
    pub fn with(mut self, field: SpecField, value: impl Into<String>) -> Self {
        self.specs.insert(field, value.into());
        self
    }

    #[inline]
    pub fn key(&self) -> CarKey {
        (self.make.clone(), self.model.clone())
    }

    /// Value of `field`, or `None` when the column was absent.
    pub fn get(&self, field: SpecField) -> Option<&str> {
        self.specs.get(&field).map(String::as_str)
    }

    /// A row is only usable by the search and analysis stages when both
    /// `Make` and `Model` are non-empty.
    pub fn is_identified(&self) -> bool {
        !self.make.is_empty() && !self.model.is_empty()
    }
}

/// Outcome of one remote call, as persisted in the search results file.
///
/// `response` is `None` when the call failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(rename = "gemini_response", default)]
    pub response: Option<String>,
}

impl SearchResult {
    #[inline]
    pub fn key(&self) -> CarKey {
        (self.make.clone(), self.model.clone())
    }
}
