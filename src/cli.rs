use std::path::PathBuf;
use url::Url;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("Missing timetable URL. Run `timetable-tui --help` for usage.")]
    MissingUrl,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Option {0} needs a value")]
    MissingValue(&'static str),
    #[error("Unknown option {0}")]
    UnknownOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Init,
    Purge,
    Select {
        url: Url,
        data_file: Option<PathBuf>,
        dry_run: bool,
    },
}

/// Parse the arguments after the program name. `host` is the only host a
/// timetable URL may point at.
pub fn parse_args(args: &[String], host: &str) -> Result<Command, InvalidInputError> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Command::Help);
    }
    if args.iter().any(|a| a == "--init") {
        return Ok(Command::Init);
    }
    if args.iter().any(|a| a == "--purge") {
        return Ok(Command::Purge);
    }

    let mut url = None;
    let mut data_file = None;
    let mut dry_run = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            "--data" => {
                let value = iter.next().ok_or(InvalidInputError::MissingValue("--data"))?;
                data_file = Some(PathBuf::from(value));
            }
            other if other.starts_with("--") => {
                return Err(InvalidInputError::UnknownOption(other.to_string()))
            }
            other => url = Some(validate_timetable_url(other, host)?),
        }
    }

    let url = url.ok_or(InvalidInputError::MissingUrl)?;
    Ok(Command::Select {
        url,
        data_file,
        dry_run,
    })
}

/// Accept only `https://<host>/timetable/...`.
pub fn validate_timetable_url(raw: &str, host: &str) -> Result<Url, InvalidInputError> {
    let invalid = || InvalidInputError::InvalidUrl(raw.to_string());
    let url = Url::parse(raw).map_err(|_| invalid())?;
    if url.scheme() != "https" || url.host_str() != Some(host) {
        return Err(invalid());
    }
    if !url.path().starts_with("/timetable/") {
        return Err(invalid());
    }
    Ok(url)
}

pub const USAGE: &str = "\
timetable-tui — build a weekly calendar from a university timetable

USAGE:
  timetable-tui <URL> [--data <file>] [--dry-run]
                         Pick subjects and sessions, then create events
  timetable-tui --purge  Delete every event created by earlier runs
  timetable-tui --init   Generate a default config file

OPTIONS:
  --data <file>   Scraper output to load (default: data_file from config)
  --dry-run       Print the events instead of creating them

CONFIG:
  File: ~/.config/timetable-tui/config.toml
  Or set env var: GOOGLE_CALENDAR_TOKEN

KEYBINDINGS:
  Up / Down (k / j)   Move
  Space               Select / deselect
  Enter               Advance
  Esc / Ctrl+C        Exit without changes";
