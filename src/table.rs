//! # Car table I/O
//!
//! Reads and writes the car table CSV:
//!
//! ```text
//! Make,Model,Year,BodyType,Cost,Length,CargoRear,CargoTotal,MpgCity,MpgHwy,MpgCombo,FuelType,Drive,Reliability
//! ```
//!
//! Columns are matched by header name, so a table missing some specification
//! columns still loads; those fields are simply absent from
//! [`CarRecord::specs`]. Unknown columns are ignored and are not written back.

use crate::models::{CarRecord, SpecField};
use std::{error::Error, path::Path};
use tracing::{debug, info};

/// Identity columns that precede the specification columns.
pub const MAKE: &str = "Make";
pub const MODEL: &str = "Model";

/// Full header row written by [`write_rows`].
pub fn headers() -> Vec<&'static str> {
    let mut headers = vec![MAKE, MODEL];
    headers.extend(SpecField::ALL.iter().map(|f| f.label()));
    headers
}

/// Load every row of the table, including rows without a Make or Model.
///
/// A missing file yields an empty table rather than an error.
pub fn read_rows(path: &Path) -> Result<Vec<CarRecord>, Box<dyn Error>> {
    if !path.exists() {
        info!("Car table not found: {}", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let header = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut car = CarRecord::default();
        for (name, value) in header.iter().zip(record.iter()) {
            match name {
                MAKE => car.make = value.to_string(),
                MODEL => car.model = value.to_string(),
                other => {
                    if let Some(field) = SpecField::from_label(other) {
                        car.specs.insert(field, value.to_string());
                    }
                }
            }
        }
        rows.push(car);
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load the cars usable by the search and analysis stages: rows with an
/// empty Make or Model are dropped.
pub fn load_cars(path: &Path) -> Result<Vec<CarRecord>, Box<dyn Error>> {
    let cars: Vec<CarRecord> = read_rows(path)?
        .into_iter()
        .filter(CarRecord::is_identified)
        .collect();
    Ok(cars)
}

/// Rewrite the whole table with the fixed header. Absent values become empty cells.
pub fn write_rows(path: &Path, rows: &[CarRecord]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers())?;

    for car in rows {
        let mut record = vec![car.make.as_str(), car.model.as_str()];
        record.extend(SpecField::ALL.iter().map(|f| car.get(*f).unwrap_or("")));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
