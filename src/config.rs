//! Configuration file handling.
//!
//! Settings live in an optional `buttonlog.toml`. Every field has a default,
//! so an empty file (or no file) reproduces the standard analysis.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "buttonlog.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Token selection settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Species names as written in the recordings.
    #[serde(default)]
    pub species: SpeciesConfig,
}

/// Image format for rendered charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PlotFormat {
    #[default]
    Png,
    Svg,
}

impl PlotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

/// Where and how results are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the table, charts and pair counts.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name of the flattened event table.
    #[serde(default = "default_table")]
    pub table: String,

    /// Chart image format.
    #[serde(default)]
    pub format: PlotFormat,

    /// Chart width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// TrueType font used for text in PNG charts.
    /// When unset, a few common system locations are tried.
    #[serde(default)]
    pub font: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            table: default_table(),
            format: PlotFormat::default(),
            width: default_width(),
            height: default_height(),
            font: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_table() -> String {
    "table.csv".to_string()
}

fn default_width() -> u32 {
    1850
}

fn default_height() -> u32 {
    1050
}

/// Which button presses count as tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Event type of a board press.
    #[serde(default = "default_event_type")]
    pub event_type: String,

    /// Tokens must be strictly shorter than this many characters.
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Content containing any of these substrings is dropped.
    #[serde(default = "default_exclude_substrings")]
    pub exclude_substrings: Vec<String>,

    /// Content equal to any of these values is dropped.
    #[serde(default = "default_exclude_literals")]
    pub exclude_literals: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            event_type: default_event_type(),
            max_len: default_max_len(),
            exclude_substrings: default_exclude_substrings(),
            exclude_literals: default_exclude_literals(),
        }
    }
}

fn default_event_type() -> String {
    crate::schema::BUTTON_PRESS.to_string()
}

fn default_max_len() -> usize {
    10
}

fn default_exclude_substrings() -> Vec<String> {
    vec!["OTHER".to_string(), " or ".to_string()]
}

fn default_exclude_literals() -> Vec<String> {
    vec![String::new(), crate::schema::NULL_CONTENT.to_string()]
}

/// Species names used in the `agents` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    #[serde(default = "default_dog")]
    pub dog: String,

    #[serde(default = "default_human")]
    pub human: String,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            dog: default_dog(),
            human: default_human(),
        }
    }
}

fn default_dog() -> String {
    "canis familiaris".to_string()
}

fn default_human() -> String {
    "homo sapiens".to_string()
}

impl SpeciesConfig {
    /// Short label used in chart categories ("dog", "human"); other species
    /// keep their full name.
    pub fn label<'a>(&self, species: &'a str) -> &'a str {
        if species == self.dog {
            "dog"
        } else if species == self.human {
            "human"
        } else {
            species
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;

        toml::from_str(&content).map_err(|e| AnalysisError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>, AnalysisError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Path of the flattened event table.
    pub fn table_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.table)
    }

    /// Path of a chart with the configured image extension.
    pub fn plot_path(&self, stem: &str) -> PathBuf {
        self.output
            .dir
            .join(format!("{}.{}", stem, self.output.format.extension()))
    }
}
