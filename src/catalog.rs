use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::{RawRow, SubjectKey, TimetableEntry, Weekday};

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("Could not read timetable data at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Timetable data at {path} is not valid scraper output: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Row {index}: unknown day {day:?}")]
    UnknownDay { index: usize, day: String },
    #[error("Row {index}: invalid time range {start}-{end}")]
    InvalidTime { index: usize, start: u8, end: u8 },
    #[error("Row {index}: missing subject name")]
    MissingSubject { index: usize },
}

// ─── Catalog ────────────────────────────────────────────────────────────────

/// Every scraped timetable entry, in scrape order. Read-only after load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<TimetableEntry>,
}

impl Catalog {
    pub fn load(rows: Vec<RawRow>) -> Result<Self, DataSourceError> {
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| entry_from_row(index, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Read the scraper's JSON feed export.
    pub fn from_file(path: &Path) -> Result<Self, DataSourceError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DataSourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let rows: Vec<RawRow> =
            serde_json::from_str(&contents).map_err(|source| DataSourceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::load(rows)?;
        info!(path = %path.display(), entries = catalog.len(), "timetable loaded");
        Ok(catalog)
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct subjects ordered by name, ignoring case.
    pub fn unique_subjects(&self) -> Vec<SubjectKey> {
        let mut seen = HashSet::new();
        let mut subjects: Vec<SubjectKey> = self
            .entries
            .iter()
            .filter(|e| seen.insert(&e.subject))
            .map(|e| e.subject.clone())
            .collect();
        subjects.sort_by_cached_key(|s| s.as_str().to_uppercase());
        subjects
    }

    /// Every entry whose subject is in `subjects`, in catalog order.
    pub fn entries_for(&self, subjects: &HashSet<SubjectKey>) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| subjects.contains(&e.subject))
            .collect()
    }

    /// Entries grouped by subject, groups in order of first appearance.
    pub fn grouped_by_subject(&self) -> Vec<(&SubjectKey, Vec<&TimetableEntry>)> {
        let mut groups: Vec<(&SubjectKey, Vec<&TimetableEntry>)> = Vec::new();
        for entry in &self.entries {
            match groups.iter().position(|(key, _)| *key == &entry.subject) {
                Some(idx) => groups[idx].1.push(entry),
                None => groups.push((&entry.subject, vec![entry])),
            }
        }
        debug!(subjects = groups.len(), "grouped catalog by subject");
        groups
    }
}

fn entry_from_row(index: usize, row: RawRow) -> Result<TimetableEntry, DataSourceError> {
    let subject = row.subject.trim();
    if subject.is_empty() {
        return Err(DataSourceError::MissingSubject { index });
    }
    let day = Weekday::from_name(&row.day).ok_or_else(|| DataSourceError::UnknownDay {
        index,
        day: row.day.clone(),
    })?;
    let (start, end) = row.time;
    if start >= end || end > 23 {
        return Err(DataSourceError::InvalidTime { index, start, end });
    }
    Ok(TimetableEntry {
        subject: SubjectKey::new(subject),
        day,
        start_hour: start,
        end_hour: end,
        room: row.classroom.trim().to_string(),
        instructor: row.prof.trim().to_string(),
    })
}
