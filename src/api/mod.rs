use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::models::CalendarEventDraft;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/";

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unauthorized – check your calendar access token")]
    Unauthorized,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

// ─── Collaborator contract ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The event was already gone.
    NotFound,
}

/// The calendar operations the app relies on. Authentication is the
/// implementation's business.
#[allow(async_fn_in_trait)]
pub trait CalendarService {
    /// Create the event and return its id.
    async fn insert_event(&self, draft: &CalendarEventDraft) -> Result<String, CalendarError>;
    async fn delete_event(&self, event_id: &str) -> Result<Deletion, CalendarError>;
}

// ─── Wire format ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct ReminderOverride {
    method: String,
    minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reminders {
    use_default: bool,
    overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventResource {
    summary: String,
    location: String,
    start: EventTime,
    end: EventTime,
    recurrence: Vec<String>,
    reminders: Reminders,
    #[serde(skip_serializing_if = "Option::is_none")]
    color_id: Option<String>,
}

impl From<&CalendarEventDraft> for EventResource {
    fn from(draft: &CalendarEventDraft) -> Self {
        Self {
            summary: draft.summary.clone(),
            location: draft.location.clone(),
            start: EventTime {
                date_time: draft.start.to_rfc3339(),
                time_zone: draft.time_zone.clone(),
            },
            end: EventTime {
                date_time: draft.end.to_rfc3339(),
                time_zone: draft.time_zone.clone(),
            },
            recurrence: vec![draft.recurrence.rrule().to_string()],
            reminders: Reminders {
                use_default: draft.use_default_reminders,
                overrides: draft
                    .reminders
                    .iter()
                    .map(|r| ReminderOverride {
                        method: r.method.clone(),
                        minutes: r.minutes,
                    })
                    .collect(),
            },
            color_id: draft.color_id.map(|c| c.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: String,
}

// ─── Client ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: Url,
    calendar_id: String,
    token: String,
}

impl GoogleCalendarClient {
    pub fn new(calendar_id: &str, token: &str) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, calendar_id, token)
    }

    pub fn with_base_url(base_url: &str, calendar_id: &str, token: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid calendar API URL: {base_url}"))?;

        let client = Client::builder()
            .user_agent(concat!("timetable-tui/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            calendar_id: calendar_id.to_string(),
            token: token.to_string(),
        })
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url, CalendarError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("Calendar API URL cannot be a base"))?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn check_status(resp: Response) -> Result<Response, CalendarError> {
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(CalendarError::Unauthorized),
            s if s.is_client_error() || s.is_server_error() => {
                let status = s.as_u16();
                let message = resp.text().await.unwrap_or_default();
                Err(CalendarError::Api { status, message })
            }
            _ => Ok(resp),
        }
    }
}

impl CalendarService for GoogleCalendarClient {
    async fn insert_event(&self, draft: &CalendarEventDraft) -> Result<String, CalendarError> {
        let url = self.events_url(None)?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&EventResource::from(draft))
            .send()
            .await?;
        let event: InsertedEvent = Self::check_status(resp).await?.json().await?;
        debug!(id = %event.id, subject = %draft.subject, "event inserted");
        Ok(event.id)
    }

    async fn delete_event(&self, event_id: &str) -> Result<Deletion, CalendarError> {
        let url = self.events_url(Some(event_id))?;
        let resp = self
            .client
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                warn!(id = event_id, "event no longer exists");
                Ok(Deletion::NotFound)
            }
            _ => {
                Self::check_status(resp).await?;
                Ok(Deletion::Deleted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recurrence, Reminder, SubjectKey};
    use chrono::DateTime;

    fn draft(color_id: Option<u8>) -> CalendarEventDraft {
        CalendarEventDraft {
            summary: "MATH_P   |   P22   |   Ana Kos".into(),
            subject: SubjectKey::new("MATH_P"),
            room: "P22".into(),
            instructor: "Ana Kos".into(),
            location: "FRI".into(),
            start: DateTime::parse_from_rfc3339("2024-03-11T08:00:00+01:00").unwrap(),
            end: DateTime::parse_from_rfc3339("2024-03-11T10:00:00+01:00").unwrap(),
            time_zone: "Europe/Ljubljana".into(),
            recurrence: Recurrence::Weekly,
            use_default_reminders: false,
            reminders: vec![Reminder {
                method: "popup".into(),
                minutes: 30,
            }],
            color_id,
        }
    }

    #[test]
    fn event_resource_matches_calendar_api_shape() {
        let json = serde_json::to_value(EventResource::from(&draft(Some(3)))).unwrap();
        assert_eq!(json["start"]["dateTime"], "2024-03-11T08:00:00+01:00");
        assert_eq!(json["start"]["timeZone"], "Europe/Ljubljana");
        assert_eq!(json["recurrence"][0], "RRULE:FREQ=WEEKLY");
        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 30);
        assert_eq!(json["colorId"], "3");
    }

    #[test]
    fn missing_color_is_omitted() {
        let json = serde_json::to_value(EventResource::from(&draft(None))).unwrap();
        assert!(json.get("colorId").is_none());
    }

    #[test]
    fn events_url_escapes_calendar_id() {
        let client = GoogleCalendarClient::new("me@example.com", "token").unwrap();
        assert_eq!(
            client.events_url(Some("abc123")).unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/me@example.com/events/abc123"
        );
        let client = GoogleCalendarClient::new("team cal", "token").unwrap();
        assert_eq!(
            client.events_url(None).unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%20cal/events"
        );
    }
}
