use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::{CalendarService, Deletion};
use crate::models::CalendarEventDraft;

// ─── Path ────────────────────────────────────────────────────────────────────

/// Default location of the id log, next to other per-user app data.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("timetable-tui").join("events_ids.csv"))
}

// ─── I/O ─────────────────────────────────────────────────────────────────────

/// Append ids as `id,` so the file stays one comma-joined list across runs.
pub fn append_ids(path: &Path, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open event log at {}", path.display()))?;
    for id in ids {
        write!(file, "{id},")?;
    }
    Ok(())
}

pub fn read_ids(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Event log not found at {}", path.display()))?;
    Ok(contents
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect())
}

// ─── Publish ─────────────────────────────────────────────────────────────────

/// Insert every draft in order, one request at a time, and log the ids. An
/// insert failure stops the run; ids created before it are still logged.
pub async fn publish<S: CalendarService>(
    service: &S,
    drafts: &[CalendarEventDraft],
    log_path: &Path,
) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match service.insert_event(draft).await {
            Ok(id) => ids.push(id),
            Err(e) => {
                let failure = format!(
                    "Failed to create event for {} ({} of {} created)",
                    draft.subject,
                    ids.len(),
                    drafts.len()
                );
                // Keep the insert error visible when the log write fails too.
                append_ids(log_path, &ids).with_context(|| {
                    format!("{failure}: {e}; created ids could not be logged")
                })?;
                return Err(e).context(failure);
            }
        }
    }
    append_ids(log_path, &ids)?;
    info!(events = ids.len(), log = %log_path.display(), "events published");
    Ok(ids)
}

// ─── Purge ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: usize,
    /// Ids the calendar no longer knew about.
    pub missing: Vec<String>,
    /// Ids that could not be deleted and were kept in the log.
    pub failed: Vec<(String, String)>,
}

/// Delete every logged event. The log is removed only after every id has
/// been tried; ids that failed for reasons other than "not found" are
/// written back for a later retry.
pub async fn purge<S: CalendarService>(service: &S, log_path: &Path) -> Result<PurgeReport> {
    let ids = read_ids(log_path)?;
    let mut report = PurgeReport::default();

    for id in ids {
        match service.delete_event(&id).await {
            Ok(Deletion::Deleted) => report.deleted += 1,
            Ok(Deletion::NotFound) => {
                warn!(id = %id, "event doesn't exist, skipping");
                report.missing.push(id);
            }
            Err(e) => {
                warn!(id = %id, error = %e, "failed to delete event");
                report.failed.push((id, e.to_string()));
            }
        }
    }

    std::fs::remove_file(log_path)
        .with_context(|| format!("Failed to remove event log at {}", log_path.display()))?;
    let retry: Vec<String> = report.failed.iter().map(|(id, _)| id.clone()).collect();
    append_ids(log_path, &retry)?;

    info!(
        deleted = report.deleted,
        missing = report.missing.len(),
        failed = report.failed.len(),
        "purge finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CalendarError;
    use crate::models::{Recurrence, SubjectKey};
    use chrono::DateTime;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// In-memory calendar. Inserts fail once `fail_after` events exist.
    #[derive(Default)]
    struct FakeCalendar {
        events: RefCell<Vec<String>>,
        fail_after: Option<usize>,
        broken_ids: HashSet<String>,
    }

    impl CalendarService for FakeCalendar {
        async fn insert_event(&self, _draft: &CalendarEventDraft) -> Result<String, CalendarError> {
            let mut events = self.events.borrow_mut();
            if self.fail_after.is_some_and(|n| events.len() >= n) {
                return Err(CalendarError::Api {
                    status: 500,
                    message: "backend error".into(),
                });
            }
            let id = format!("evt{}", events.len());
            events.push(id.clone());
            Ok(id)
        }

        async fn delete_event(&self, event_id: &str) -> Result<Deletion, CalendarError> {
            if self.broken_ids.contains(event_id) {
                return Err(CalendarError::Unauthorized);
            }
            let mut events = self.events.borrow_mut();
            match events.iter().position(|e| e == event_id) {
                Some(idx) => {
                    events.remove(idx);
                    Ok(Deletion::Deleted)
                }
                None => Ok(Deletion::NotFound),
            }
        }
    }

    fn draft(subject: &str) -> CalendarEventDraft {
        let start = DateTime::parse_from_rfc3339("2024-03-11T08:00:00+01:00").unwrap();
        CalendarEventDraft {
            summary: subject.into(),
            subject: SubjectKey::new(subject),
            room: String::new(),
            instructor: String::new(),
            location: String::new(),
            start,
            end: start,
            time_zone: "Europe/Ljubljana".into(),
            recurrence: Recurrence::Weekly,
            use_default_reminders: false,
            reminders: Vec::new(),
            color_id: None,
        }
    }

    #[test]
    fn append_accumulates_comma_joined_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events_ids.csv");
        append_ids(&path, &["a".into(), "b".into()]).unwrap();
        append_ids(&path, &["c".into()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b,c,");
        assert_eq!(read_ids(&path).unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn reading_missing_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_ids(&dir.path().join("events_ids.csv")).is_err());
    }

    #[tokio::test]
    async fn publish_logs_every_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events_ids.csv");
        let calendar = FakeCalendar::default();

        let ids = publish(&calendar, &[draft("MATH_P"), draft("MATH_LV")], &path)
            .await
            .unwrap();
        assert_eq!(ids, ["evt0", "evt1"]);
        assert_eq!(read_ids(&path).unwrap(), ids);
    }

    #[tokio::test]
    async fn failed_insert_still_logs_created_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events_ids.csv");
        let calendar = FakeCalendar {
            fail_after: Some(1),
            ..Default::default()
        };

        let err = publish(&calendar, &[draft("MATH_P"), draft("OS_P")], &path)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("OS_P"));
        assert_eq!(read_ids(&path).unwrap(), ["evt0"]);
    }

    #[tokio::test]
    async fn unwritable_log_keeps_insert_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let path = dir.path().to_path_buf();
        let calendar = FakeCalendar {
            fail_after: Some(1),
            ..Default::default()
        };

        let err = publish(&calendar, &[draft("MATH_P"), draft("OS_P")], &path)
            .await
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("OS_P"), "{message}");
        assert!(message.contains("HTTP 500: backend error"), "{message}");
        assert!(message.contains("could not be logged"), "{message}");
    }

    #[tokio::test]
    async fn purge_skips_missing_and_removes_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events_ids.csv");
        let calendar = FakeCalendar::default();
        publish(&calendar, &[draft("A_P"), draft("B_P")], &path)
            .await
            .unwrap();
        append_ids(&path, &["gone".into()]).unwrap();

        let report = purge(&calendar, &path).await.unwrap();
        assert_eq!(report.deleted, 2);
        assert_eq!(report.missing, ["gone"]);
        assert!(report.failed.is_empty());
        assert!(!path.exists());
        assert!(calendar.events.borrow().is_empty());
    }

    #[tokio::test]
    async fn purge_keeps_ids_that_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events_ids.csv");
        let calendar = FakeCalendar {
            broken_ids: ["evt1".to_string()].into(),
            ..Default::default()
        };
        publish(&calendar, &[draft("A_P"), draft("B_P")], &path)
            .await
            .unwrap();

        let report = purge(&calendar, &path).await.unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(read_ids(&path).unwrap(), ["evt1"]);
    }
}
