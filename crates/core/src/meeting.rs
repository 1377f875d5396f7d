use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CrmError;
use crate::time::{parse_clock, parse_date};
use crate::user::AuthUser;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Activity-log action for a transition into this status.
    #[must_use]
    pub fn action_label(&self) -> String {
        match self {
            Self::Completed => "Completed meeting".to_owned(),
            Self::Cancelled => "Cancelled meeting".to_owned(),
            Self::Scheduled => format!("Updated meeting status to {}", self.as_str()),
        }
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MeetingStatus {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(CrmError::invalid_value("meeting status", s)),
        }
    }
}

/// Denormalized reference to a meeting participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Attendee {
    fn describe(&self) -> String {
        let name = self.name.as_deref().unwrap_or("Unknown");
        match &self.phone {
            Some(phone) => format!("{name} ({phone})"),
            None => name.to_owned(),
        }
    }
}

/// `"Name (phone), Other"` or `"No attendees"`.
#[must_use]
pub fn attendee_summary(attendees: &[Attendee]) -> String {
    if attendees.is_empty() {
        return "No attendees".to_owned();
    }
    attendees.iter().map(Attendee::describe).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meeting {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub title: String,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    pub status: MeetingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingInput {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// Partial update. At least one field must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub attendees: Option<Vec<Attendee>>,
    pub status: Option<MeetingStatus>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_time(value: Option<String>) -> Result<Option<String>, CrmError> {
    non_blank(value).map(|t| parse_clock(&t)).transpose()
}

fn require_title(title: &str) -> Result<String, CrmError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CrmError::InvalidInput("meeting title must not be empty".to_owned()));
    }
    Ok(title.to_owned())
}

impl Meeting {
    pub fn new(input: MeetingInput, user: &AuthUser, now: DateTime<Utc>) -> Result<Self, CrmError> {
        Ok(Self {
            id: crate::new_id(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            title: require_title(&input.title)?,
            date: parse_date(&input.date)?,
            time: parse_time(input.time)?,
            location: non_blank(input.location),
            notes: non_blank(input.notes),
            attendees: input.attendees,
            status: MeetingStatus::Scheduled,
            created_at: now,
        })
    }

    /// `"2026-10-16 14:30"`, or just the date when no time is set.
    #[must_use]
    pub fn when(&self) -> String {
        match &self.time {
            Some(time) => format!("{} {time}", self.date),
            None => self.date.to_string(),
        }
    }

    /// Phone of the first attendee, used to resolve the activity-log target.
    #[must_use]
    pub fn first_attendee_phone(&self) -> Option<&str> {
        self.attendees.first().and_then(|a| a.phone.as_deref())
    }

    #[must_use]
    pub fn log_details(&self) -> String {
        format!(
            "Meeting: {}, Date: {}, Attendees: {}",
            self.title,
            self.when(),
            attendee_summary(&self.attendees)
        )
    }
}

/// Outcome of applying a [`MeetingPatch`]: the activity action and details to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingChange {
    pub action: String,
    pub details: String,
}

impl MeetingPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
            && self.notes.is_none()
            && self.attendees.is_none()
            && self.status.is_none()
    }

    /// Apply to `meeting` and describe the change. A date or time change is
    /// a reschedule; otherwise a status change wins; otherwise a plain update.
    pub fn apply(self, meeting: &mut Meeting) -> Result<MeetingChange, CrmError> {
        if self.is_empty() {
            return Err(CrmError::InvalidInput("no update data provided".to_owned()));
        }
        let before = meeting.clone();
        let rescheduled = self.date.is_some() || self.time.is_some();

        if let Some(title) = self.title {
            meeting.title = require_title(&title)?;
        }
        if let Some(date) = self.date {
            meeting.date = parse_date(&date)?;
        }
        if self.time.is_some() {
            meeting.time = parse_time(self.time)?;
        }
        if self.location.is_some() {
            meeting.location = non_blank(self.location);
        }
        if self.notes.is_some() {
            meeting.notes = non_blank(self.notes);
        }
        if let Some(attendees) = self.attendees {
            meeting.attendees = attendees;
        }
        if let Some(status) = self.status {
            meeting.status = status;
        }

        let attendees = attendee_summary(&before.attendees);
        let change = if rescheduled {
            MeetingChange {
                action: "Rescheduled meeting".to_owned(),
                details: format!(
                    "Meeting: {}, From: {}, To: {}, Attendees: {attendees}",
                    before.title,
                    before.when(),
                    meeting.when()
                ),
            }
        } else if let Some(status) = self.status {
            MeetingChange {
                action: format!("Updated meeting status to {status}"),
                details: format!("Meeting: {}, Status: {status}, Attendees: {attendees}", before.title),
            }
        } else {
            MeetingChange {
                action: "Updated meeting".to_owned(),
                details: format!("Meeting: {}, Attendees: {attendees}", before.title),
            }
        };
        Ok(change)
    }
}
