//! Main module for the carspec CLI application.
//!
//! Parses the command line, loads the configuration and runs one pipeline stage.
//!
//! # Examples
//!
//! ```sh
//! carspec prompt Mazda "3 Hatchback"
//! carspec search
//! carspec extract
//! carspec analyze
//! carspec init
//! ```

use carspec::{
    analyze,
    api::OpenAiGenerator,
    commands::{Cli, Commands},
    config::{self, CarSpecConfig},
    merge::{self, MergeOutcome},
    rate_limit::RateLimiter,
    search::{self, SearchPlan},
    table, template,
};
use clap::Parser;
use once_cell::sync::OnceCell;
use std::{error::Error, fs, path::PathBuf, process::ExitCode};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> ExitCode {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    });

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, parses command-line arguments and executes the command.
async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let carspec_config = config::resolve_config(cli.config.as_deref())?;
    debug!("Config loaded: {:?}", carspec_config);

    match cli.command {
        Commands::Prompt {
            make,
            model,
            year_range,
        } => {
            let year_range = year_range.unwrap_or_else(|| carspec_config.year_range.clone());
            let template = template::load_template_or_default(&carspec_config.template_name)?;
            println!("{}", template.render(&make, &model, &year_range));
        }
        Commands::Search { table, output } => {
            let table_path = table.unwrap_or_else(|| carspec_config.table_path());
            let output_path = output.unwrap_or_else(|| carspec_config.results_path());
            run_search(&carspec_config, table_path, output_path).await?;
        }
        Commands::Extract {
            table,
            results,
            history,
        } => {
            let table_path = table.unwrap_or_else(|| carspec_config.table_path());
            let results_path = results.unwrap_or_else(|| carspec_config.results_path());
            let history_dir = history.unwrap_or_else(|| carspec_config.history_dir());

            match merge::update_table(&table_path, &results_path, &history_dir)? {
                MergeOutcome::Updated { updated_rows, .. } => {
                    println!("Updated {} cars in {}", updated_rows, table_path.display());
                }
                MergeOutcome::NoResults => println!("No JSON data to process"),
                MergeOutcome::NoTable => println!("No CSV data found"),
            }
        }
        Commands::Analyze { table } => {
            let table_path = table.unwrap_or_else(|| carspec_config.table_path());
            let cars = table::load_cars(&table_path)?;
            for line in analyze::report(&cars) {
                println!("{line}");
            }
        }
        Commands::Init => {
            debug!("Initializing configuration");
            init()?;
        }
    }

    Ok(())
}

async fn run_search(
    carspec_config: &CarSpecConfig,
    table_path: PathBuf,
    output_path: PathBuf,
) -> Result<(), Box<dyn Error>> {
    let api_key = carspec_config.api_key()?;
    let template = template::load_template_or_default(&carspec_config.template_name)?;
    let generator =
        OpenAiGenerator::new(carspec_config, api_key, template.system_prompt.clone())?;
    let mut limiter = RateLimiter::per_minute(carspec_config.requests_per_minute);

    let cars = table::load_cars(&table_path)?;
    let plan = SearchPlan {
        template: &template,
        year_range: &carspec_config.year_range,
    };
    let results = search::search_cars(&cars, &generator, &mut limiter, &plan).await?;

    search::save_results(&output_path, &results)?;
    println!("Results saved to {}", output_path.display());
    Ok(())
}

/// Writes the default configuration and prompt template to the config directory.
///
/// Existing files are left untouched.
fn init() -> Result<(), Box<dyn Error>> {
    let config_dir = carspec::config_dir()?;
    let templates_dir = config_dir.join("templates");
    info!("Creating template config directory: {}", templates_dir.display());
    fs::create_dir_all(&templates_dir)?;

    let carspec_config = CarSpecConfig::default();

    let template_path = template::template_path(&carspec_config.template_name)?;
    if template_path.exists() {
        info!("Template already exists: {}", template_path.display());
    } else {
        info!("Creating template file: {}", template_path.display());
        let template_yaml = serde_yaml::to_string(&template::PromptTemplate::default())?;
        fs::write(&template_path, template_yaml)?;
    }

    let config_path = config_dir.join("config.yaml");
    if config_path.exists() {
        info!("Config already exists: {}", config_path.display());
    } else {
        info!("Creating config file: {}", config_path.display());
        let config_yaml = serde_yaml::to_string(&carspec_config)?;
        fs::write(&config_path, config_yaml)?;
    }

    println!("Configuration written to {}", config_dir.display());
    Ok(())
}
