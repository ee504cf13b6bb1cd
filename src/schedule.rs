//! Turning finalized sessions into recurring calendar event drafts.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use tracing::debug;

use crate::models::{CalendarEventDraft, Recurrence, Reminder, TimetableEntry};

/// Number of distinct event colours the calendar offers.
pub const PALETTE_SIZE: u8 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{date} {hour}:00 does not exist in the local time zone")]
    NonexistentTime { date: NaiveDate, hour: u8 },
}

// ─── Colours ────────────────────────────────────────────────────────────────

/// Running map from subject family to colour index, handed out in order of
/// first appearance starting at 1. Families beyond the palette get no colour.
#[derive(Debug, Clone)]
pub struct ColorAssignment {
    colors: HashMap<String, u8>,
    next: u8,
}

impl ColorAssignment {
    pub fn new() -> Self {
        Self {
            colors: HashMap::new(),
            next: 1,
        }
    }

    /// Pre-assign colours over the whole session list.
    pub fn for_sessions<'a>(sessions: impl IntoIterator<Item = &'a TimetableEntry>) -> Self {
        let mut colors = Self::new();
        for session in sessions {
            colors.assign(session.subject.family());
        }
        colors
    }

    pub fn assign(&mut self, family: &str) -> Option<u8> {
        if let Some(color) = self.get(family) {
            return Some(color);
        }
        if self.next > PALETTE_SIZE {
            return None;
        }
        let color = self.next;
        self.colors.insert(family.to_string(), color);
        self.next += 1;
        Some(color)
    }

    pub fn get(&self, family: &str) -> Option<u8> {
        self.colors.get(family).copied()
    }
}

impl Default for ColorAssignment {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EventSettings {
    pub location: String,
    pub time_zone: String,
    pub reminder_minutes: u32,
}

/// Builds drafts relative to a fixed "now", so every draft of a run agrees
/// on which week is next.
#[derive(Debug, Clone)]
pub struct EventBuilder<Tz: TimeZone> {
    now: DateTime<Tz>,
    settings: EventSettings,
}

impl<Tz: TimeZone> EventBuilder<Tz> {
    pub fn new(now: DateTime<Tz>, settings: EventSettings) -> Self {
        Self { now, settings }
    }

    pub fn build(
        &self,
        session: &TimetableEntry,
        colors: &mut ColorAssignment,
    ) -> Result<CalendarEventDraft, ScheduleError> {
        let date = next_weekday(self.now.date_naive(), session.day.to_chrono());
        let tz = self.now.timezone();
        let start = at_hour(&tz, date, session.start_hour)?;
        let end = at_hour(&tz, date, session.end_hour)?;
        let color_id = colors.assign(session.subject.family());

        debug!(subject = %session.subject, %date, ?color_id, "built event draft");

        Ok(CalendarEventDraft {
            summary: format!(
                "{}   |   {}   |   {}",
                session.subject, session.room, session.instructor
            ),
            subject: session.subject.clone(),
            room: session.room.clone(),
            instructor: session.instructor.clone(),
            location: self.settings.location.clone(),
            start: start.fixed_offset(),
            end: end.fixed_offset(),
            time_zone: self.settings.time_zone.clone(),
            recurrence: Recurrence::Weekly,
            use_default_reminders: false,
            reminders: vec![Reminder {
                method: "popup".into(),
                minutes: self.settings.reminder_minutes,
            }],
            color_id,
        })
    }

    pub fn build_all(
        &self,
        sessions: &[TimetableEntry],
    ) -> Result<Vec<CalendarEventDraft>, ScheduleError> {
        let mut colors = ColorAssignment::for_sessions(sessions);
        sessions.iter().map(|s| self.build(s, &mut colors)).collect()
    }
}

/// First date strictly after `today` falling on `weekday`.
pub fn next_weekday(today: NaiveDate, weekday: chrono::Weekday) -> NaiveDate {
    let target = i64::from(weekday.num_days_from_monday());
    let current = i64::from(today.weekday().num_days_from_monday());
    let mut ahead = target - current;
    if ahead <= 0 {
        ahead += 7;
    }
    today + Duration::days(ahead)
}

fn at_hour<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u8) -> Result<DateTime<Tz>, ScheduleError> {
    date.and_hms_opt(u32::from(hour), 0, 0)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or(ScheduleError::NonexistentTime { date, hour })
}
