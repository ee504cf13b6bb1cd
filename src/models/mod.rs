use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffixes marking lab (`LV`) and tutorial (`AV`) sessions. These usually run
/// as several parallel groups, only one of which the student attends.
pub const ALTERNATIVE_SUFFIXES: [&str; 2] = ["LV", "AV"];

/// Separator between the course code and the session type in a subject name.
pub const FAMILY_SEPARATOR: char = '_';

// ─── Scraper rows ───────────────────────────────────────────────────────────

/// One row as exported by the timetable scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub classroom: String,
    pub day: String,
    #[serde(default)]
    pub prof: String,
    pub subject: String,
    pub time: (u8, u8),
}

// ─── Subjects ───────────────────────────────────────────────────────────────

/// Subject identifier, conventionally `<course>_<sessionType>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The course part of the name, used to colour every session type of a
    /// course the same way. Names without a separator are their own family.
    pub fn family(&self) -> &str {
        match self.0.find(FAMILY_SEPARATOR) {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Labs and tutorials are offered as alternative groups.
    pub fn is_alternative_group(&self) -> bool {
        ALTERNATIVE_SUFFIXES.iter().any(|s| self.0.ends_with(s))
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Weekdays ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Accepts English names and the Slovenian names the scraper emits.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "monday" | "ponedeljek" => Some(Self::Monday),
            "tuesday" | "torek" => Some(Self::Tuesday),
            "wednesday" | "sreda" => Some(Self::Wednesday),
            "thursday" | "četrtek" | "cetrtek" => Some(Self::Thursday),
            "friday" | "petek" => Some(Self::Friday),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monday => "MONDAY",
            Self::Tuesday => "TUESDAY",
            Self::Wednesday => "WEDNESDAY",
            Self::Thursday => "THURSDAY",
            Self::Friday => "FRIDAY",
        }
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
        }
    }
}

// ─── Timetable entries ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub subject: SubjectKey,
    pub day: Weekday,
    pub start_hour: u8,
    pub end_hour: u8,
    pub room: String,
    pub instructor: String,
}

impl fmt::Display for TimetableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}:00 - {}:00",
            self.subject, self.room, self.instructor, self.start_hour, self.end_hour
        )
    }
}

// ─── Calendar drafts ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    Weekly,
}

impl Recurrence {
    pub fn rrule(self) -> &'static str {
        match self {
            Self::Weekly => "RRULE:FREQ=WEEKLY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: String,
    pub minutes: u32,
}

/// A recurring weekly event ready to be handed to the calendar service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventDraft {
    pub summary: String,
    pub subject: SubjectKey,
    pub room: String,
    pub instructor: String,
    pub location: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub time_zone: String,
    pub recurrence: Recurrence,
    pub use_default_reminders: bool,
    pub reminders: Vec<Reminder>,
    /// `None` once the colour palette is exhausted.
    pub color_id: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_stops_at_first_separator() {
        assert_eq!(SubjectKey::new("ALGORITHMS_LV").family(), "ALGORITHMS");
        assert_eq!(SubjectKey::new("OS_P_2").family(), "OS");
        assert_eq!(SubjectKey::new("SEMINAR").family(), "SEMINAR");
    }

    #[test]
    fn alternative_groups_are_labs_and_tutorials() {
        assert!(SubjectKey::new("MATH_LV").is_alternative_group());
        assert!(SubjectKey::new("MATH_AV").is_alternative_group());
        assert!(!SubjectKey::new("MATH_P").is_alternative_group());
        assert!(!SubjectKey::new("LV_INTRO_P").is_alternative_group());
    }

    #[test]
    fn weekday_parses_both_languages() {
        assert_eq!(Weekday::from_name("ponedeljek"), Some(Weekday::Monday));
        assert_eq!(Weekday::from_name("Četrtek"), Some(Weekday::Thursday));
        assert_eq!(Weekday::from_name("FRIDAY"), Some(Weekday::Friday));
        assert_eq!(Weekday::from_name("sobota"), None);
    }

    #[test]
    fn raw_row_reads_scraper_json() {
        let row: RawRow = serde_json::from_str(
            r#"{"day": "torek", "time": [8, 10], "classroom": "P1", "subject": "OS_P", "prof": "Ana Novak"}"#,
        )
        .unwrap();
        assert_eq!(row.time, (8, 10));
        assert_eq!(row.prof, "Ana Novak");
    }
}
