use std::collections::HashSet;

use tracing::{debug, info};

use super::event::PickerKey;
use super::viewport::Viewport;
use super::{Outcome, PickerState};
use crate::catalog::Catalog;
use crate::models::{SubjectKey, TimetableEntry, Weekday};

// ─── Day grouping ───────────────────────────────────────────────────────────

/// Sessions of one weekday, ascending by start hour.
#[derive(Debug, Clone)]
pub struct DayGroup<'a> {
    pub day: Weekday,
    pub sessions: Vec<&'a TimetableEntry>,
}

/// Partition sessions into weekday groups, Monday first. Days without
/// sessions are left out. Sessions starting at the same hour keep their
/// input order.
pub fn group_by_day<'a>(sessions: &[&'a TimetableEntry]) -> Vec<DayGroup<'a>> {
    Weekday::ALL
        .iter()
        .filter_map(|&day| {
            let mut day_sessions: Vec<&TimetableEntry> =
                sessions.iter().copied().filter(|e| e.day == day).collect();
            if day_sessions.is_empty() {
                return None;
            }
            day_sessions.sort_by_key(|e| e.start_hour);
            Some(DayGroup {
                day,
                sessions: day_sessions,
            })
        })
        .collect()
}

// ─── Rows ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LectureRow {
    Header(Weekday),
    /// Index into the picker's session list.
    Session(usize),
}

/// How a session row should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMark {
    Cursor,
    Selected,
    /// Not picked, but another session of the same subject is.
    DecidedElsewhere,
    Plain,
}

#[derive(Debug, Clone)]
pub struct Session<'a> {
    pub entry: &'a TimetableEntry,
    pub selected: bool,
}

// ─── Picker ─────────────────────────────────────────────────────────────────

/// Stage 2: choose the concrete lecture, lab and tutorial sessions.
#[derive(Debug, Clone)]
pub struct LecturePicker<'a> {
    /// Sessions in display order (day, then start hour).
    sessions: Vec<Session<'a>>,
    rows: Vec<LectureRow>,
    viewport: Viewport,
    state: PickerState,
}

impl<'a> LecturePicker<'a> {
    /// Build the working set from every catalog entry of the confirmed
    /// subjects. Lectures start selected; labs and tutorials do not.
    pub fn new(subjects: &[SubjectKey], catalog: &'a Catalog, visible_rows: usize) -> Self {
        let wanted: HashSet<SubjectKey> = subjects.iter().cloned().collect();
        let entries = catalog.entries_for(&wanted);

        let mut sessions = Vec::with_capacity(entries.len());
        let mut rows = Vec::with_capacity(entries.len() + Weekday::ALL.len());
        for group in group_by_day(&entries) {
            rows.push(LectureRow::Header(group.day));
            for entry in group.sessions {
                rows.push(LectureRow::Session(sessions.len()));
                sessions.push(Session {
                    entry,
                    selected: !entry.subject.is_alternative_group(),
                });
            }
        }
        debug!(
            sessions = sessions.len(),
            rows = rows.len(),
            "built lecture view"
        );

        // Row 0 is always a day header; start on the first session.
        let viewport = Viewport::new(rows.len(), visible_rows).with_highlight(1);
        Self {
            sessions,
            rows,
            viewport,
            state: PickerState::Browsing,
        }
    }

    pub fn rows(&self) -> &[LectureRow] {
        &self.rows
    }

    pub fn sessions(&self) -> &[Session<'a>] {
        &self.sessions
    }

    pub fn session(&self, idx: usize) -> Option<&Session<'a>> {
        self.sessions.get(idx)
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

    /// Toggle the session under the highlight. Header rows are inert.
    pub fn toggle_highlighted(&mut self) {
        let Some(LectureRow::Session(idx)) = self.rows.get(self.viewport.highlight()).copied()
        else {
            return;
        };
        let session = &mut self.sessions[idx];
        session.selected = !session.selected;
        debug!(
            subject = %session.entry.subject,
            day = session.entry.day.label(),
            start = session.entry.start_hour,
            selected = session.selected,
            "toggled session"
        );
    }

    /// Subjects that already have at least one selected session.
    pub fn decided_subjects(&self) -> HashSet<&SubjectKey> {
        self.sessions
            .iter()
            .filter(|s| s.selected)
            .map(|s| &s.entry.subject)
            .collect()
    }

    /// Display mark for `row`, given the decided set for this frame.
    pub fn mark(&self, row: usize, decided: &HashSet<&SubjectKey>) -> Option<RowMark> {
        let LectureRow::Session(idx) = *self.rows.get(row)? else {
            return None;
        };
        let session = &self.sessions[idx];
        let mark = if row == self.viewport.highlight() {
            RowMark::Cursor
        } else if !session.selected && decided.contains(&session.entry.subject) {
            RowMark::DecidedElsewhere
        } else if session.selected {
            RowMark::Selected
        } else {
            RowMark::Plain
        };
        Some(mark)
    }

    pub fn selected_sessions(&self) -> Vec<TimetableEntry> {
        self.sessions
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.entry.clone())
            .collect()
    }

    /// Apply one key. An empty confirm is accepted and yields no sessions.
    pub fn handle_key(&mut self, key: PickerKey) -> Option<Outcome<Vec<TimetableEntry>>> {
        if self.state != PickerState::Browsing {
            return None;
        }
        match key {
            PickerKey::Down => self.viewport.move_down(),
            PickerKey::Up => self.viewport.move_up(),
            PickerKey::Toggle => self.toggle_highlighted(),
            PickerKey::Confirm => {
                let chosen = self.selected_sessions();
                info!(sessions = chosen.len(), "sessions confirmed");
                self.state = PickerState::Confirmed;
                return Some(Outcome::Confirmed(chosen));
            }
            PickerKey::Cancel => {
                info!("session selection cancelled");
                self.state = PickerState::Cancelled;
                return Some(Outcome::Cancelled);
            }
            PickerKey::Other => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;

    fn row(subject: &str, day: &str, start: u8, end: u8, room: &str) -> RawRow {
        RawRow {
            classroom: room.into(),
            day: day.into(),
            prof: "Prof".into(),
            subject: subject.into(),
            time: (start, end),
        }
    }

    fn keys(subjects: &[&str]) -> Vec<SubjectKey> {
        subjects.iter().map(|s| SubjectKey::new(*s)).collect()
    }

    fn sample() -> Catalog {
        Catalog::load(vec![
            row("OS_LV", "sreda", 12, 14, "PR01"),
            row("OS_P", "ponedeljek", 10, 12, "P1"),
            row("OS_LV", "sreda", 8, 10, "PR02"),
            row("DB_P", "ponedeljek", 8, 10, "P2"),
            row("OS_AV", "sreda", 8, 9, "P3"),
            row("OS_LV", "petek", 8, 10, "PR03"),
        ])
        .unwrap()
    }

    #[test]
    fn rows_interleave_headers_in_weekday_order() {
        let catalog = sample();
        let picker = LecturePicker::new(&keys(&["OS_P", "OS_LV", "OS_AV"]), &catalog, 20);
        let headers: Vec<Weekday> = picker
            .rows()
            .iter()
            .filter_map(|r| match r {
                LectureRow::Header(d) => Some(*d),
                LectureRow::Session(_) => None,
            })
            .collect();
        assert_eq!(
            headers,
            [Weekday::Monday, Weekday::Wednesday, Weekday::Friday]
        );
        assert_eq!(picker.rows().len(), 3 + 5);
        assert_eq!(picker.viewport().highlight(), 1);
    }

    #[test]
    fn day_groups_are_stable_by_start_hour() {
        let catalog = sample();
        let all: Vec<&TimetableEntry> = catalog.entries().iter().collect();
        let groups = group_by_day(&all);

        for group in &groups {
            assert!(group
                .sessions
                .windows(2)
                .all(|w| w[0].start_hour <= w[1].start_hour));
        }

        let wednesday = groups
            .iter()
            .find(|g| g.day == Weekday::Wednesday)
            .unwrap();
        let rooms: Vec<&str> = wednesday.sessions.iter().map(|e| e.room.as_str()).collect();
        // PR02 and P3 both start at 8; scrape order decides.
        assert_eq!(rooms, ["PR02", "P3", "PR01"]);
    }

    #[test]
    fn defaults_select_lectures_only() {
        let catalog = sample();
        let picker = LecturePicker::new(&keys(&["OS_P", "OS_LV", "OS_AV", "DB_P"]), &catalog, 20);
        for session in picker.sessions() {
            assert_eq!(
                session.selected,
                !session.entry.subject.is_alternative_group(),
                "{}",
                session.entry
            );
        }
    }

    #[test]
    fn subject_match_pulls_every_occurrence() {
        let catalog = sample();
        let picker = LecturePicker::new(&keys(&["OS_LV"]), &catalog, 20);
        assert_eq!(picker.sessions().len(), 3);
    }

    #[test]
    fn header_rows_do_not_toggle() {
        let catalog = sample();
        let mut picker = LecturePicker::new(&keys(&["OS_P"]), &catalog, 20);
        picker.handle_key(PickerKey::Up);
        assert_eq!(picker.viewport().highlight(), 0);
        picker.handle_key(PickerKey::Toggle);
        assert!(picker.sessions()[0].selected);
    }

    #[test]
    fn toggle_twice_restores_flag() {
        let catalog = sample();
        let mut picker = LecturePicker::new(&keys(&["OS_LV"]), &catalog, 20);
        let before: Vec<bool> = picker.sessions().iter().map(|s| s.selected).collect();
        picker.handle_key(PickerKey::Toggle);
        assert_ne!(picker.sessions()[0].selected, before[0]);
        picker.handle_key(PickerKey::Toggle);
        let after: Vec<bool> = picker.sessions().iter().map(|s| s.selected).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn toggle_hits_session_behind_row() {
        let catalog = sample();
        let mut picker = LecturePicker::new(&keys(&["OS_LV"]), &catalog, 20);
        // Rows: WED, PR02, PR01, FRI, PR03
        for _ in 0..3 {
            picker.handle_key(PickerKey::Down);
        }
        assert_eq!(picker.rows()[4], LectureRow::Session(2));
        picker.handle_key(PickerKey::Toggle);
        let chosen = picker.selected_sessions();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].room, "PR03");
    }

    #[test]
    fn marks_distinguish_decided_alternatives() {
        let catalog = sample();
        let mut picker = LecturePicker::new(&keys(&["OS_LV"]), &catalog, 20);
        // Select PR02 (row 1), move to PR01 (row 2).
        picker.handle_key(PickerKey::Toggle);
        picker.handle_key(PickerKey::Down);

        let decided = picker.decided_subjects();
        assert_eq!(picker.mark(0, &decided), None);
        assert_eq!(picker.mark(1, &decided), Some(RowMark::Selected));
        assert_eq!(picker.mark(2, &decided), Some(RowMark::Cursor));
        assert_eq!(picker.mark(4, &decided), Some(RowMark::DecidedElsewhere));
    }

    #[test]
    fn empty_confirm_is_legal() {
        let catalog = sample();
        let mut picker = LecturePicker::new(&keys(&["OS_LV"]), &catalog, 20);
        match picker.handle_key(PickerKey::Confirm) {
            Some(Outcome::Confirmed(sessions)) => assert!(sessions.is_empty()),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(picker.state(), PickerState::Confirmed);
    }

    #[test]
    fn confirm_returns_display_order() {
        let catalog = sample();
        let mut picker = LecturePicker::new(&keys(&["OS_P", "DB_P"]), &catalog, 20);
        let Some(Outcome::Confirmed(sessions)) = picker.handle_key(PickerKey::Confirm) else {
            panic!("expected confirm");
        };
        let names: Vec<&str> = sessions.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(names, ["DB_P", "OS_P"]);
    }
}
