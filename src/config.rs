use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::event_log::default_log_path;
use crate::schedule::EventSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calendar to write into; `primary` is the account's main calendar.
    pub calendar_id: String,
    /// OAuth bearer token with calendar scope. Falls back to
    /// `GOOGLE_CALENDAR_TOKEN`.
    pub access_token: Option<String>,
    pub time_zone: String,
    pub location: String,
    pub reminder_minutes: u32,
    /// Host the timetable URL must point at.
    pub timetable_host: String,
    /// Scraper output to load.
    pub data_file: PathBuf,
    /// Where created event ids are appended.
    pub event_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar_id: "primary".into(),
            access_token: None,
            time_zone: "Europe/Ljubljana".into(),
            location: "FRI, Večna pot 113, Ljubljana".into(),
            reminder_minutes: 30,
            timetable_host: "urnik.fri.uni-lj.si".into(),
            data_file: PathBuf::from("timetable_data.json"),
            event_log: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                Self::parse(&contents)?
            }
            _ => Self::default(),
        };

        if config.access_token.is_none() {
            config.access_token = std::env::var("GOOGLE_CALENDAR_TOKEN").ok();
        }
        Ok(config)
    }

    /// Host for URL validation. Reads just that key, so a broken config file
    /// never blocks `--help`, `--init` or the URL check.
    pub fn timetable_host() -> String {
        let contents = Self::config_path().and_then(|p| std::fs::read_to_string(p).ok());
        Self::host_from(contents.as_deref())
    }

    fn host_from(contents: Option<&str>) -> String {
        contents
            .and_then(|c| c.parse::<toml::Table>().ok())
            .and_then(|t| t.get("timetable_host")?.as_str().map(str::to_string))
            .unwrap_or_else(|| Self::default().timetable_host)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let default = Config {
            access_token: Some("your-oauth-access-token".into()),
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&default)?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    pub fn access_token(&self) -> Result<&str> {
        self.access_token.as_deref().with_context(|| {
            "No calendar access token. Set access_token in config.toml \
             or the GOOGLE_CALENDAR_TOKEN environment variable."
        })
    }

    pub fn event_log_path(&self) -> Result<PathBuf> {
        self.event_log
            .clone()
            .or_else(default_log_path)
            .with_context(|| "Could not determine data directory for the event log")
    }

    pub fn event_settings(&self) -> EventSettings {
        EventSettings {
            location: self.location.clone(),
            time_zone: self.time_zone.clone(),
            reminder_minutes: self.reminder_minutes,
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("timetable-tui").join("config.toml"))
    }
}
