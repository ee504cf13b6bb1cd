pub mod event;
pub mod lectures;
pub mod subjects;
pub mod ui;
pub mod viewport;

use std::io;

use anyhow::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::catalog::Catalog;
use crate::models::TimetableEntry;
use event::PickerKey;
use lectures::LecturePicker;
use subjects::SubjectPicker;

// ─── Picker states ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Browsing,
    Confirmed,
    Cancelled,
}

/// Terminal result of a picker.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Confirmed(T),
    Cancelled,
}

// ─── Frontend ───────────────────────────────────────────────────────────────

/// Everything the selection flow needs from a screen: key input, a row
/// budget, and drawing. The terminal implementation lives below; tests drive
/// the flow with a scripted one.
pub trait Frontend {
    /// Rows available to the list pane.
    fn visible_rows(&mut self) -> Result<usize>;
    fn next_key(&mut self) -> Result<PickerKey>;
    fn draw_subjects(&mut self, picker: &SubjectPicker) -> Result<()>;
    fn draw_lectures(&mut self, picker: &LecturePicker<'_>) -> Result<()>;
    /// Wipe the screen before the next stage takes over.
    fn reset(&mut self) -> Result<()>;
}

pub struct TerminalFrontend<'t> {
    terminal: &'t mut Terminal<CrosstermBackend<io::Stdout>>,
}

impl<'t> TerminalFrontend<'t> {
    pub fn new(terminal: &'t mut Terminal<CrosstermBackend<io::Stdout>>) -> Self {
        Self { terminal }
    }
}

impl Frontend for TerminalFrontend<'_> {
    fn visible_rows(&mut self) -> Result<usize> {
        let size = self.terminal.size()?;
        Ok(ui::list_rows(size.height))
    }

    fn next_key(&mut self) -> Result<PickerKey> {
        event::next_key()
    }

    fn draw_subjects(&mut self, picker: &SubjectPicker) -> Result<()> {
        self.terminal.draw(|f| ui::render_subjects(f, picker))?;
        Ok(())
    }

    fn draw_lectures(&mut self, picker: &LecturePicker<'_>) -> Result<()> {
        self.terminal.draw(|f| ui::render_lectures(f, picker))?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.terminal.clear()?;
        Ok(())
    }
}

// ─── Flow ───────────────────────────────────────────────────────────────────

/// Run both selection stages. Returns `None` when the user cancelled at
/// either stage, otherwise the finalized sessions (possibly empty).
pub fn run_selection<F: Frontend>(
    frontend: &mut F,
    catalog: &Catalog,
) -> Result<Option<Vec<TimetableEntry>>> {
    let mut subjects = SubjectPicker::new(catalog, frontend.visible_rows()?);
    let chosen = loop {
        frontend.draw_subjects(&subjects)?;
        let key = frontend.next_key()?;
        match subjects.handle_key(key) {
            Some(Outcome::Confirmed(chosen)) => break chosen,
            Some(Outcome::Cancelled) => return Ok(None),
            None => subjects.resize(frontend.visible_rows()?),
        }
    };

    frontend.reset()?;
    info!(subjects = chosen.len(), "entering session selection");

    let mut lectures = LecturePicker::new(&chosen, catalog, frontend.visible_rows()?);
    loop {
        frontend.draw_lectures(&lectures)?;
        let key = frontend.next_key()?;
        match lectures.handle_key(key) {
            Some(Outcome::Confirmed(sessions)) => return Ok(Some(sessions)),
            Some(Outcome::Cancelled) => return Ok(None),
            None => lectures.resize(frontend.visible_rows()?),
        }
    }
}
