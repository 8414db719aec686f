//! This module provides functionality for loading and handling the application's configuration.
//!
//! It defines the `CarSpecConfig` struct, which holds the configuration parameters,
//! and a `load_config` function to load the configuration from a YAML file.
//!
//! # Examples
//!
//! Loading the configuration from a file:
//!
//! ```no_run
//! use carspec::config::{CarSpecConfig, load_config};
//! use std::path::Path;
//!
//! let config: CarSpecConfig = load_config(Path::new("/path/to/config.yaml")).unwrap();
//! println!("{:?}", config);
//! ```

use serde::{Deserialize, Serialize};
use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
};
use tracing::*;

use crate::{rate_limit::DEFAULT_REQUESTS_PER_MINUTE, template::DEFAULT_YEAR_RANGE};

pub const TABLE_FILE: &str = "car_data.csv";
pub const RESULTS_FILE: &str = "car_search.json";
pub const HISTORY_DIR: &str = "history";

/// Represents the application's configuration.
///
/// Every field has a default, so a partial YAML file only needs to name the
/// values it changes.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct CarSpecConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Model used for the specification searches.
    pub model: String,

    /// Outbound request ceiling per rolling minute.
    pub requests_per_minute: usize,

    /// Year range quoted in every prompt.
    pub year_range: String,

    /// Prompt template name under `<config_dir>/templates/`; the built-in
    /// template is used when the file does not exist.
    pub template_name: String,

    /// Directory holding the car table, search results, `history/` and `.env`.
    pub data_dir: PathBuf,
}

impl Default for CarSpecConfig {
    fn default() -> Self {
        CarSpecConfig {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-2.0-flash-lite".to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            year_range: DEFAULT_YEAR_RANGE.to_string(),
            template_name: "car_search".to_string(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl CarSpecConfig {
    pub fn table_path(&self) -> PathBuf {
        self.data_dir.join(TABLE_FILE)
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_dir.join(RESULTS_FILE)
    }

    pub fn history_dir(&self) -> PathBuf {
        self.data_dir.join(HISTORY_DIR)
    }

    /// Read the API key from the environment, after loading `.env` from the data
    /// directory and then the current directory. Variables already set win.
    ///
    /// # Errors
    /// Returns an error when the variable is unset or empty.
    pub fn api_key(&self) -> Result<String, Box<dyn Error>> {
        let env_path = self.data_dir.join(".env");
        match dotenvy::from_path(&env_path) {
            Ok(()) => debug!("Loaded environment from {}", env_path.display()),
            Err(e) => debug!("No environment file at {}: {}", env_path.display(), e),
        }
        let _ = dotenvy::dotenv();

        match env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(format!(
                "{} is not set. Add it to {} or export it before running a search.",
                self.api_key_env,
                env_path.display()
            )
            .into()),
        }
    }
}

/// Loads the application's configuration from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// `CarSpecConfig`.
pub fn load_config(file: &Path) -> Result<CarSpecConfig, Box<dyn Error>> {
    debug!("Loading config from: {}", file.display());
    let content = fs::read_to_string(file)?;
    let config: CarSpecConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Resolve the configuration to use.
///
/// An explicit path must exist. Without one, `<config_dir>/config.yaml` is used
/// when present, otherwise [`CarSpecConfig::default`].
pub fn resolve_config(explicit: Option<&Path>) -> Result<CarSpecConfig, Box<dyn Error>> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let default_path = crate::config_dir()?.join("config.yaml");
    if default_path.exists() {
        load_config(&default_path)
    } else {
        info!(
            "No config at {}, using defaults (run `carspec init` to create one)",
            default_path.display()
        );
        Ok(CarSpecConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
api_base: "http://example.com/v1"
api_key_env: "EXAMPLE_KEY"
model: "example_model"
requests_per_minute: 10
year_range: "2010-2014"
template_name: "short"
data_dir: "/tmp/cars"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path());

        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.api_base, "http://example.com/v1");
        assert_eq!(config.api_key_env, "EXAMPLE_KEY");
        assert_eq!(config.model, "example_model");
        assert_eq!(config.requests_per_minute, 10);
        assert_eq!(config.year_range, "2010-2014");
        assert_eq!(config.template_name, "short");
        assert_eq!(config.table_path(), PathBuf::from("/tmp/cars/car_data.csv"));
        assert_eq!(config.history_dir(), PathBuf::from("/tmp/cars/history"));
    }

    #[test]
    fn test_load_config_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "model: \"gemini-2.5-flash\"").unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.requests_per_minute, 30);
        assert_eq!(config.year_range, DEFAULT_YEAR_RANGE);
    }

    #[test]
    fn test_load_config_invalid_file() {
        let config = load_config(Path::new("non/existent/path"));
        assert!(config.is_err());
    }

    #[test]
    fn test_load_config_invalid_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"invalid: config: format"#).unwrap();

        let config = load_config(temp_file.path());
        assert!(config.is_err());
    }

    #[test]
    fn test_api_key_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "CARSPEC_TEST_KEY_FROM_FILE=abc123\n").unwrap();
        let config = CarSpecConfig {
            api_key_env: "CARSPEC_TEST_KEY_FROM_FILE".to_string(),
            data_dir: dir.path().to_path_buf(),
            ..CarSpecConfig::default()
        };
        assert_eq!(config.api_key().unwrap(), "abc123");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CarSpecConfig {
            api_key_env: "CARSPEC_TEST_KEY_NEVER_SET".to_string(),
            data_dir: dir.path().to_path_buf(),
            ..CarSpecConfig::default()
        };
        let err = config.api_key().unwrap_err();
        assert!(err.to_string().contains("CARSPEC_TEST_KEY_NEVER_SET"));
    }
}
