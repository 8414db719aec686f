//! # Search prompt templates
//!
//! A template is a small YAML document holding the text sent for one car:
//!
//! ```yaml
//! # <config_dir>/templates/car_search.yaml
//! system_prompt: "You are a meticulous automotive researcher."   # optional
//! body: |
//!   Please find the specifications for the {make} {model} ({year_range}).
//!   ...
//! ```
//!
//! `body` may use the placeholders `{make}`, `{model}`, `{year_range}` and
//! `{make_lower}`. [`PromptTemplate::default`] is the built-in template; it asks for
//! the twelve specification fields in the `Field: value` format that
//! [`crate::extract`] parses.

use serde::{Deserialize, Serialize};
use std::{error::Error, fs, path::Path};

pub const DEFAULT_YEAR_RANGE: &str = "2015-2020";

const DEFAULT_BODY: &str = r#"
SEARCH PROMPT FOR: {make} {model}

Please find the following specifications for the {make} {model} ({year_range}):

REQUIRED DATA POINTS:
0. Year: [Model year: XXXX]
1. BodyType [Sedan, Coupe, SUV, etc.]
2. Cost: [Edmunds, Kelly Blue Book, CarGurus, etc.]
3. Length: [Overall length in inches: XXX.X]
4. CargoRear: [Rear cargo space in cubic feet: XX.X]
5. CargoTotal: [Total cargo space with seats folded in cubic feet: XX.X]
6. MpgCity: [EPA city fuel economy: XX]
7. MpgHwy: [EPA highway fuel economy: XX]
8. MpgCombo: [EPA combined fuel economy: XX]
9. FuelType: [Gasoline/Diesel/Hybrid/Electric/Plug-in Hybrid]
10. Drive: [FWD/RWD/AWD/4WD]
11. Reliability: [Edmunds, Kelly Blue Book, CarGurus, etc.]

SEARCH TERMS TO USE:
- "{make} {model} {year_range} specifications"
- "{make} {model} {year_range} MSRP price"
- "{make} {model} {year_range} dimensions cargo space"
- "{make} {model} {year_range} fuel economy MPG"
- "{make} {model} {year_range} drivetrain"

PREFERRED SOURCES:
- Official manufacturer websites ({make_lower}.com)
- Edmunds.com
- KBB.com (Kelley Blue Book)
- Cars.com
- MotorTrend.com
- Car and Driver
- EPA fuel economy database

FORMAT YOUR FINDINGS AS:
Year: [value]
BodyType: [value]
Cost: [value]
Length: [value]
CargoRear: [value]
CargoTotal: [value]
MpgCity: [value]
MpgHwy: [value]
MpgCombo: [value]
FuelType: [value]
Drive: [value]
Reliability: [value]

NOTES:
- If multiple trim levels exist, use the BASE/ENTRY level specifications
- If data varies by year within range, use the MOST COMMON year (typically {year_range})
- Mark any unavailable data as "N/A"
- For electric vehicles, use "Electric" for FuelType and MPGe values for fuel economy
"#;

/// A search prompt template.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PromptTemplate {
    /// Optional system message sent ahead of the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Prompt text with `{make}`, `{model}`, `{year_range}` and `{make_lower}` placeholders.
    pub body: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        PromptTemplate {
            system_prompt: None,
            body: DEFAULT_BODY.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Fill in the placeholders and trim surrounding whitespace.
    pub fn render(&self, make: &str, model: &str, year_range: &str) -> String {
        self.body
            .replace("{make_lower}", &make.to_lowercase())
            .replace("{make}", make)
            .replace("{model}", model)
            .replace("{year_range}", year_range)
            .trim()
            .to_string()
    }
}

/// Render the built-in search prompt for one car.
pub fn generate_search_prompt(make: &str, model: &str, year_range: &str) -> String {
    PromptTemplate::default().render(make, model, year_range)
}

/// Load a template from an explicit YAML file.
pub fn load_template_from(path: &Path) -> Result<PromptTemplate, Box<dyn Error>> {
    tracing::info!("Loading template: {}", path.display());
    let content = fs::read_to_string(path)?;
    let template: PromptTemplate = serde_yaml::from_str(&content)?;
    Ok(template)
}

/// Path of a named template under the config directory.
pub fn template_path(name: &str) -> Result<std::path::PathBuf, Box<dyn Error>> {
    Ok(crate::config_dir()?.join(format!("templates/{name}.yaml")))
}

/// The named template when its file exists, else the built-in one.
pub fn load_template_or_default(name: &str) -> Result<PromptTemplate, Box<dyn Error>> {
    let path = template_path(name)?;
    if path.exists() {
        load_template_from(&path)
    } else {
        tracing::debug!("No template at {}, using built-in prompt", path.display());
        Ok(PromptTemplate::default())
    }
}
