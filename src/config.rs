use chrono_tz::Tz;
use config::{Config, FileFormat};
use hex_color::HexColor;
use log::debug;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::directions::DirectionsSettings;
use crate::transxchange::direction::{Direction, DirectionClassifier, DirectionTerms};

pub const DEFAULT_API_KEY_FILE: &str = "~/.gcloud/dcommute-service-account-key.json";

#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    #[error("Failed reading configuration '{0}': {1}")]
    ConfigReadError(String, #[source] config::ConfigError),
    #[error("API key file not found at {0}")]
    ApiKeyNotFound(String),
    #[error("Could not read API key file {0}: {1}")]
    ApiKeyUnreadable(String, #[source] io::Error),
    #[error("API key file {0} is empty")]
    ApiKeyEmpty(String),
    #[error("Invalid timezone '{0}': {1}")]
    InvalidTimezone(String, String),
    #[error("Invalid color '{0}' for route {1}: {2}")]
    InvalidColor(String, String, #[source] hex_color::ParseHexColorError),
}

// AppConfig holds everything a run needs besides the timetable itself.
// Every field has a default, so an empty file (or none at all) is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // file holding the Directions API key; a leading ~/ is expanded from $HOME
    pub api_key_file: String,
    // minimum gap between consecutive Directions API calls
    pub pacing_ms: u64,
    // IANA timezone of the timetables
    pub timezone: String,
    // directory searched for timetable-<route>.xml files
    pub timetable_dir: String,
    pub directions: DirectionsSettings,
    pub direction_terms: DirectionTerms,
    pub routes: Vec<RouteConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_key_file: String::from(DEFAULT_API_KEY_FILE),
            pacing_ms: 200,
            timezone: String::from("Europe/London"),
            timetable_dir: String::from("."),
            directions: DirectionsSettings::default(),
            direction_terms: DirectionTerms::default(),
            routes: vec![RouteConfig {
                route_name: String::from("X90"),
                directions: both_directions(),
                color: None,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteConfig {
    pub route_name: String,
    #[serde(default = "both_directions")]
    pub directions: Vec<Direction>,
    // heading colour in reports, #RRGGBB
    #[serde(default)]
    pub color: Option<String>,
}

fn both_directions() -> Vec<Direction> {
    vec![Direction::Inbound, Direction::Outbound]
}

impl RouteConfig {
    pub fn color(&self) -> Result<Option<HexColor>, AppConfigError> {
        self.color.as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                HexColor::from_str(s)
                    .map_err(|e| AppConfigError::InvalidColor(s.to_string(), self.route_name.clone(), e))
            })
            .transpose()
    }
}

impl AppConfig {
    // load reads a TOML file layered over the defaults, or just the defaults
    // when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppConfigError> {
        match path {
            Some(path) => {
                let name = path.display().to_string();
                debug!("Reading config from file {}", name);
                Self::build(config::File::new(&name, FileFormat::Toml), &name)
            }
            None => Self::build(config::File::from_str("", FileFormat::Toml), "defaults"),
        }
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, AppConfigError> {
        Self::build(config::File::from_str(toml, FileFormat::Toml), "inline configuration")
    }

    fn build<S>(source: S, name: &str) -> Result<Self, AppConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Config::builder()
            .add_source(source)
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(|e| AppConfigError::ConfigReadError(name.to_string(), e))
    }

    pub fn api_key_path(&self) -> PathBuf {
        expand_home(&self.api_key_file)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timezone(&self) -> Result<Tz, AppConfigError> {
        Tz::from_str(&self.timezone)
            .map_err(|e| AppConfigError::InvalidTimezone(self.timezone.clone(), e.to_string()))
    }

    pub fn timetable_dir(&self) -> PathBuf {
        expand_home(&self.timetable_dir)
    }

    pub fn direction_classifier(&self) -> DirectionClassifier {
        DirectionClassifier::new(&self.direction_terms)
    }

    pub fn route(&self, route_name: &str) -> Option<&RouteConfig> {
        self.routes.iter().find(|route| route.route_name == route_name)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

// read_api_key reads the Directions API key, ignoring surrounding whitespace.
pub fn read_api_key(path: &Path) -> Result<String, AppConfigError> {
    let name = path.display().to_string();
    let key = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppConfigError::ApiKeyNotFound(name.clone()),
        _ => AppConfigError::ApiKeyUnreadable(name.clone(), e),
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AppConfigError::ApiKeyEmpty(name));
    }
    Ok(key.to_string())
}
