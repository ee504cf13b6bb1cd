mod api;
mod catalog;
mod cli;
mod config;
mod event_log;
mod models;
mod schedule;
mod tui;

use anyhow::{bail, Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, Level};

use api::GoogleCalendarClient;
use catalog::Catalog;
use cli::Command;
use config::Config;
use models::{CalendarEventDraft, TimetableEntry};
use schedule::EventBuilder;
use tui::TerminalFrontend;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // A bad URL is rejected before anything else happens.
    let command = cli::parse_args(&args, &Config::timetable_host())?;
    init_logging();

    match command {
        Command::Help => println!("{}", cli::USAGE),
        Command::Init => {
            let path = Config::generate_default()?;
            println!("Generated config file at: {}", path.display());
            println!("Add a calendar access token, then run timetable-tui <URL>.");
        }
        Command::Purge => purge(&load_config()?).await?,
        Command::Select {
            url,
            data_file,
            dry_run,
        } => {
            let config = load_config()?;
            info!(%url, "starting timetable selection");
            let data_file = data_file.unwrap_or_else(|| config.data_file.clone());
            let catalog = Catalog::from_file(&data_file).with_context(|| {
                format!(
                    "Make sure the scraper has run: \
                     scrapy crawl timetable -o {} -a url={url}",
                    data_file.display()
                )
            })?;
            if catalog.is_empty() {
                bail!("No sessions found in {}", data_file.display());
            }

            let Some(sessions) = run_tui(&catalog)? else {
                println!("Cancelled. No events were created.");
                return Ok(());
            };

            let drafts = EventBuilder::new(chrono::Local::now(), config.event_settings())
                .build_all(&sessions)?;
            if dry_run {
                print_drafts(&drafts);
            } else {
                publish(&config, &drafts).await?;
            }
        }
    }

    Ok(())
}

fn load_config() -> Result<Config> {
    Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `timetable-tui --init` to generate a config file."
    })
}

/// Log to a file: stdout belongs to the alternate screen while pickers run.
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("timetable-tui")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("timetable-tui.log"))
    else {
        return;
    };

    tracing_subscriber::fmt()
        .with_max_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn run_tui(catalog: &Catalog) -> Result<Option<Vec<TimetableEntry>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = tui::run_selection(&mut TerminalFrontend::new(&mut terminal), catalog);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn print_drafts(drafts: &[CalendarEventDraft]) {
    for draft in drafts {
        let color = draft
            .color_id
            .map_or_else(|| "undefined".to_string(), |c| c.to_string());
        println!(
            "{}  {} - {}  weekly  color {}",
            draft.summary,
            draft.start.format("%a %Y-%m-%d %H:%M"),
            draft.end.format("%H:%M"),
            color
        );
    }
    println!("{} event(s) would be created.", drafts.len());
}

async fn publish(config: &Config, drafts: &[CalendarEventDraft]) -> Result<()> {
    if drafts.is_empty() {
        println!("No sessions selected. No events were created.");
        return Ok(());
    }
    let client = GoogleCalendarClient::new(&config.calendar_id, config.access_token()?)?;
    let log_path: PathBuf = config.event_log_path()?;
    let ids = event_log::publish(&client, drafts, &log_path).await?;
    println!(
        "Created {} event(s). Ids logged to {}.",
        ids.len(),
        log_path.display()
    );
    Ok(())
}

async fn purge(config: &Config) -> Result<()> {
    let client = GoogleCalendarClient::new(&config.calendar_id, config.access_token()?)?;
    let log_path = config.event_log_path()?;
    let report = event_log::purge(&client, &log_path).await?;

    for id in &report.missing {
        println!("Event: {id} doesn't exist");
    }
    for (id, err) in &report.failed {
        eprintln!("Event: {id} could not be deleted: {err}");
    }
    println!("Deleted {} event(s).", report.deleted);
    if !report.failed.is_empty() {
        println!(
            "{} id(s) kept in {} for another --purge.",
            report.failed.len(),
            log_path.display()
        );
    }
    Ok(())
}
