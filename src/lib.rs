//! # carspec (library root)
//!
//! Plumbing for the **carspec** CLI, a small pipeline that collects car
//! specifications from an OpenAI-compatible text-generation API:
//!
//! 1. [`template`]: build the search prompt for one make/model.
//! 2. [`search`]: walk the car table, throttle requests ([`rate_limit`]), call the
//!    API ([`api`]) and store the raw answers as JSON.
//! 3. [`extract`] + [`merge`]: parse the answers into normalized fields, back up the
//!    table and merge the fields into it.
//! 4. [`analyze`]: rank cars by cargo space per length and by that ratio times
//!    combined fuel economy.
//!
//! The stages only share files on disk: the car table CSV ([`table`]), the search
//! results JSON and the `history/` backups.
//!
//! ## Modules
//! - [`analyze`], [`api`], [`commands`], [`config`], [`extract`], [`merge`],
//!   [`models`], [`rate_limit`], [`search`], [`table`], [`template`]

use directories::ProjectDirs;
use std::error::Error;

pub mod analyze;
pub mod api;
pub mod commands;
pub mod config;
pub mod extract;
pub mod merge;
pub mod models;
pub mod rate_limit;
pub mod search;
pub mod table;
pub mod template;

/// Return the per-platform configuration directory used by carspec.
///
/// This uses [`directories::ProjectDirs`] with the application triple
/// `("com", "carspec", "carspec")`, e.g. `~/.config/carspec` on Linux.
///
/// The directory is **not** created by this function.
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be determined.
pub fn config_dir() -> Result<std::path::PathBuf, Box<dyn Error>> {
    let proj_dirs = ProjectDirs::from("com", "carspec", "carspec")
        .ok_or("Unable to determine config directory")?;
    Ok(proj_dirs.config_dir().to_path_buf())
}
