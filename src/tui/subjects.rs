use tracing::{debug, info};

use super::event::PickerKey;
use super::viewport::Viewport;
use super::{Outcome, PickerState};
use crate::catalog::Catalog;
use crate::models::SubjectKey;

/// One row of the stage 1 list.
#[derive(Debug, Clone)]
pub struct SubjectRow {
    pub subject: SubjectKey,
    /// Number of catalog sessions behind this subject.
    pub sessions: usize,
    pub selected: bool,
}

/// Stage 1: choose which subjects the student is enrolled in.
#[derive(Debug, Clone)]
pub struct SubjectPicker {
    rows: Vec<SubjectRow>,
    viewport: Viewport,
    state: PickerState,
}

impl SubjectPicker {
    pub fn new(catalog: &Catalog, visible_rows: usize) -> Self {
        let groups = catalog.grouped_by_subject();
        let rows: Vec<SubjectRow> = catalog
            .unique_subjects()
            .into_iter()
            .map(|subject| {
                let sessions = groups
                    .iter()
                    .find(|(key, _)| **key == subject)
                    .map_or(0, |(_, entries)| entries.len());
                SubjectRow {
                    subject,
                    sessions,
                    selected: false,
                }
            })
            .collect();
        let viewport = Viewport::new(rows.len(), visible_rows);
        Self {
            rows,
            viewport,
            state: PickerState::Browsing,
        }
    }

    pub fn rows(&self) -> &[SubjectRow] {
        &self.rows
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[cfg(test)]
    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn resize(&mut self, visible_rows: usize) {
        self.viewport.resize(visible_rows);
    }

    /// Read-only feedback pane: subjects currently ticked, in list order.
    pub fn selected_subjects(&self) -> Vec<&SubjectKey> {
        self.rows
            .iter()
            .filter(|r| r.selected)
            .map(|r| &r.subject)
            .collect()
    }

    pub fn toggle_highlighted(&mut self) {
        if let Some(row) = self.rows.get_mut(self.viewport.highlight()) {
            row.selected = !row.selected;
            debug!(subject = %row.subject, selected = row.selected, "toggled subject");
        }
    }

    /// Apply one key. Returns the outcome once the picker reaches a terminal
    /// state; keys arriving after that are ignored.
    pub fn handle_key(&mut self, key: PickerKey) -> Option<Outcome<Vec<SubjectKey>>> {
        if self.state != PickerState::Browsing {
            return None;
        }
        match key {
            PickerKey::Down => self.viewport.move_down(),
            PickerKey::Up => self.viewport.move_up(),
            PickerKey::Toggle => self.toggle_highlighted(),
            PickerKey::Confirm => {
                let chosen: Vec<SubjectKey> =
                    self.selected_subjects().into_iter().cloned().collect();
                if chosen.is_empty() {
                    debug!("confirm ignored: no subjects selected");
                    return None;
                }
                info!(subjects = chosen.len(), "subjects confirmed");
                self.state = PickerState::Confirmed;
                return Some(Outcome::Confirmed(chosen));
            }
            PickerKey::Cancel => {
                info!("subject selection cancelled");
                self.state = PickerState::Cancelled;
                for row in &mut self.rows {
                    row.selected = false;
                }
                return Some(Outcome::Cancelled);
            }
            PickerKey::Other => {}
        }
        None
    }
}
