//! # Table merge
//!
//! Folds extracted specifications back into the car table.
//!
//! The table on disk is first copied byte-for-byte into the history directory as
//! `<stem>_backup_YYYYMMDD_HHMMSS.csv`; only once that copy exists is the table
//! rewritten. Fields an extracted specification names are overwritten (an extracted
//! `N/A` included); every other field keeps its value.

use crate::{
    extract::extract_all,
    models::{CarKey, CarRecord, Specification},
    search::load_results,
    table,
};
use chrono::{DateTime, Local};
use std::{
    collections::HashMap,
    error::Error,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// What [`update_table`] did.
#[derive(Debug, PartialEq)]
pub enum MergeOutcome {
    /// The table was rewritten after backing it up.
    Updated {
        updated_rows: usize,
        backup: PathBuf,
    },
    /// No search results to merge; the table was not touched.
    NoResults,
    /// The table was missing or empty; nothing was written.
    NoTable,
}

/// Overwrite the fields of every row that has an extracted specification.
///
/// Returns the number of rows that received at least one field.
pub fn apply_specs(rows: &mut [CarRecord], specs: &HashMap<CarKey, Specification>) -> usize {
    let mut updated = 0;
    for row in rows.iter_mut() {
        let Some(found) = specs.get(&row.key()) else {
            continue;
        };
        for (field, value) in found {
            row.specs.insert(*field, value.clone());
        }
        if !found.is_empty() {
            updated += 1;
        }
    }
    updated
}

/// Copy `table` into `history_dir` under a timestamped name and return the new path.
///
/// An existing backup is never overwritten; a `_N` suffix is added instead.
pub fn backup_table(
    table: &Path,
    history_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(history_dir)?;

    let stem = table
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("car_data");
    let base = format!("{}_backup_{}", stem, now.format("%Y%m%d_%H%M%S"));

    let mut backup = history_dir.join(format!("{base}.csv"));
    let mut n = 1;
    while backup.exists() {
        backup = history_dir.join(format!("{base}_{n}.csv"));
        n += 1;
    }

    fs::copy(table, &backup)?;
    info!("Backup created: {}", backup.display());
    Ok(backup)
}

/// Extract specifications from the results file and merge them into the table.
pub fn update_table(
    table_path: &Path,
    results_path: &Path,
    history_dir: &Path,
) -> Result<MergeOutcome, Box<dyn Error>> {
    let results = load_results(results_path)?;
    let mut rows = table::read_rows(table_path)?;

    if results.is_empty() {
        debug!("No JSON data to process");
        return Ok(MergeOutcome::NoResults);
    }
    if rows.is_empty() {
        debug!("No CSV data found");
        return Ok(MergeOutcome::NoTable);
    }

    info!("Processing {} cars from JSON...", results.len());
    let specs = extract_all(&results);
    let updated_rows = apply_specs(&mut rows, &specs);

    let backup = backup_table(table_path, history_dir, Local::now())?;
    table::write_rows(table_path, &rows)?;

    debug!("Updated {} cars in {}", updated_rows, table_path.display());
    Ok(MergeOutcome::Updated {
        updated_rows,
        backup,
    })
}
