//! # Search client
//!
//! Walks the car table, asks the text-generation service about each car and
//! collects the raw answers:
//!
//! 1. Load cars (rows without both Make and Model are skipped).
//! 2. For each car, in table order: wait on the [`RateLimiter`], render the prompt,
//!    call the [`TextGenerator`].
//! 3. A failed call is logged and recorded with no response. A rejected API key
//!    aborts the run before anything is written.
//! 4. Save all results as a JSON array.

use crate::{
    api::TextGenerator,
    models::{CarRecord, SearchResult},
    rate_limit::RateLimiter,
    template::PromptTemplate,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{error::Error, fs, path::Path};
use tracing::{debug, info, warn};

/// Everything one search run needs besides the generator.
pub struct SearchPlan<'a> {
    pub template: &'a PromptTemplate,
    pub year_range: &'a str,
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar
}

/// Search every car in order, one request at a time.
///
/// # Errors
/// Returns an error only when the provider rejects the API key; other failures
/// become a result with `response: None`.
pub async fn search_cars<G: TextGenerator>(
    cars: &[CarRecord],
    generator: &G,
    limiter: &mut RateLimiter,
    plan: &SearchPlan<'_>,
) -> Result<Vec<SearchResult>, Box<dyn Error>> {
    info!("Processing {} cars...", cars.len());
    let bar = progress_bar(cars.len());
    let mut results = Vec::with_capacity(cars.len());

    for (i, car) in cars.iter().enumerate() {
        info!(
            "[{}/{}] Searching for {} {}...",
            i + 1,
            cars.len(),
            car.make,
            car.model
        );
        bar.set_message(format!("{} {}", car.make, car.model));

        limiter.acquire().await;

        let prompt = plan.template.render(&car.make, &car.model, plan.year_range);
        let response = match generator.generate(&prompt).await {
            Ok(text) => Some(text),
            Err(err) if err.is_fatal() => {
                bar.abandon();
                return Err(err.into());
            }
            Err(err) => {
                warn!("Error searching for {} {}: {}", car.make, car.model, err);
                None
            }
        };

        results.push(SearchResult {
            make: car.make.clone(),
            model: car.model.clone(),
            response,
        });
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(results)
}

/// Write results as pretty-printed JSON.
pub fn save_results(path: &Path, results: &[SearchResult]) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)?;
    debug!("Results saved to {}", path.display());
    Ok(())
}

/// Read a results file. A missing file is reported and yields no results.
pub fn load_results(path: &Path) -> Result<Vec<SearchResult>, Box<dyn Error>> {
    if !path.exists() {
        warn!("JSON file not found: {}", path.display());
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    let results: Vec<SearchResult> = serde_json::from_str(&content)?;
    Ok(results)
}
