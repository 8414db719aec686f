//! This module defines the command-line interface for the application using `clap`.
//!
//! It provides a `Cli` struct that represents the parsed command-line arguments,
//! and a `Commands` enum with one subcommand per pipeline stage.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use carspec::commands::{Cli, Commands};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Commands::Prompt { make, model, .. } => println!("{make} {model}"),
//!     _ => {}
//! }
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Represents the parsed command-line arguments.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    color = clap::ColorChoice::Auto
)]
pub struct Cli {
    /// Config file to use instead of `<config_dir>/config.yaml`.
    #[arg(long, short = 'c', global = true, env = "CARSPEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// The parsed subcommand and its options.
    #[command(subcommand)]
    pub command: Commands,
}

/// Represents the available subcommands and their options.
#[derive(Subcommand, Debug)]
#[command(about, long_about = None)]
pub enum Commands {
    /// Print the search prompt for one car.
    #[clap(name = "prompt", alias = "p")]
    Prompt {
        make: String,
        model: String,

        /// Model years to ask about. Defaults to the configured range.
        #[arg(long, short = 'y')]
        year_range: Option<String>,
    },

    /// Ask the text-generation service about every car in the table.
    #[clap(name = "search", alias = "s")]
    Search {
        /// Car table CSV. Defaults to `<data_dir>/car_data.csv`.
        #[arg(long, short = 't')]
        table: Option<PathBuf>,

        /// Where to write the raw answers. Defaults to `<data_dir>/car_search.json`.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Extract specifications from the search results and merge them into the table.
    #[clap(name = "extract", alias = "x")]
    Extract {
        #[arg(long, short = 't')]
        table: Option<PathBuf>,

        /// Search results JSON. Defaults to `<data_dir>/car_search.json`.
        #[arg(long, short = 'r')]
        results: Option<PathBuf>,

        /// Backup directory. Defaults to `<data_dir>/history`.
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Print the cargo-efficiency ranking.
    #[clap(name = "analyze", alias = "a")]
    Analyze {
        #[arg(long, short = 't')]
        table: Option<PathBuf>,
    },

    /// Write the default config file and prompt template to the config directory.
    Init,
}
