//! Cargo-efficiency rankings over the car table.
//!
//! - **Cargo ratio**: `CargoTotal / Length`, for rows with `Length > 0`.
//! - **Efficiency**: cargo ratio × `MpgCombo`, for rows with `MpgCombo > 0`,
//!   taken from the cargo ranking in its sorted order.
//!
//! Both rankings are sorted descending with a stable sort. Rows whose Length,
//! CargoTotal or MpgCombo cannot be parsed are left out of both.

use crate::models::{CarRecord, SpecField};
use std::ops::Range;

/// Ranks printed by `carspec analyze`: third through seventeenth.
pub const DISPLAY_WINDOW: Range<usize> = 2..17;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCar {
    pub make: String,
    pub model: String,
    pub value: f64,
}

impl RankedCar {
    pub fn display_line(&self) -> String {
        format!("{} {}: {:.2}", self.make, self.model, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Measured<'a> {
    car: &'a CarRecord,
    length: f64,
    cargo: f64,
    mpg_combo: f64,
}

/// Missing column counts as 0; anything else must parse to a finite number.
fn number(car: &CarRecord, field: SpecField) -> Option<f64> {
    match car.get(field) {
        None => Some(0.0),
        Some(raw) => raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn measure(car: &CarRecord) -> Option<Measured<'_>> {
    Some(Measured {
        car,
        length: number(car, SpecField::Length)?,
        cargo: number(car, SpecField::CargoTotal)?,
        mpg_combo: number(car, SpecField::MpgCombo)?,
    })
}

fn sort_descending(ranked: &mut [(Measured<'_>, f64)]) {
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
}

fn cargo_ranking(cars: &[CarRecord]) -> Vec<(Measured<'_>, f64)> {
    let mut ranked: Vec<_> = cars
        .iter()
        .filter_map(measure)
        .filter(|m| m.length > 0.0)
        .map(|m| {
            let ratio = m.cargo / m.length;
            (m, ratio)
        })
        .collect();
    sort_descending(&mut ranked);
    ranked
}

fn to_ranked(ranked: Vec<(Measured<'_>, f64)>) -> Vec<RankedCar> {
    ranked
        .into_iter()
        .map(|(m, value)| RankedCar {
            make: m.car.make.clone(),
            model: m.car.model.clone(),
            value,
        })
        .collect()
}

/// Cars ranked by cargo space per unit length, best first.
pub fn cargo_to_length(cars: &[CarRecord]) -> Vec<RankedCar> {
    to_ranked(cargo_ranking(cars))
}

/// Cars ranked by cargo-per-length × combined MPG, best first.
pub fn cargo_efficiency(cars: &[CarRecord]) -> Vec<RankedCar> {
    let mut ranked: Vec<_> = cargo_ranking(cars)
        .into_iter()
        .filter(|(m, _)| m.mpg_combo > 0.0)
        .map(|(m, ratio)| {
            let value = ratio * m.mpg_combo;
            (m, value)
        })
        .collect();
    sort_descending(&mut ranked);
    to_ranked(ranked)
}

/// The slice of `ranked` inside `window`, clamped to its length.
pub fn window(ranked: &[RankedCar], window: Range<usize>) -> &[RankedCar] {
    let end = window.end.min(ranked.len());
    let start = window.start.min(end);
    &ranked[start..end]
}

/// Lines printed by `carspec analyze`.
pub fn report(cars: &[CarRecord]) -> Vec<String> {
    let ranked = cargo_efficiency(cars);
    window(&ranked, DISPLAY_WINDOW)
        .iter()
        .map(RankedCar::display_line)
        .collect()
}
