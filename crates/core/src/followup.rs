//! Follow-ups and their time-derived classification.
//!
//! Only `pending` and `completed` are ever stored. Whether a pending
//! follow-up is overdue depends on the clock, so it is computed on read by
//! [`FollowUp::classify`] and never written back.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::error::CrmError;
use crate::time::{deserialize_opt_timestamp, deserialize_timestamp, end_of_day, start_of_day};
use crate::user::AuthUser;

/// Stored lifecycle status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStatus {
    #[default]
    Pending,
    Completed,
}

impl FollowUpStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for FollowUpStatus {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(CrmError::invalid_value("follow-up status", s)),
        }
    }
}

/// Classification relative to a point in time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpState {
    Overdue,
    Upcoming,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowUp {
    pub id: String,
    pub contact_id: String,
    pub user_id: String,
    pub user_email: String,
    pub follow_up_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: FollowUpStatus,
    /// Set once a reminder e-mail went out. Never reset.
    pub notified: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Follow-up whose completion scheduled this one.
    pub previous_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowUpInput {
    pub contact_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub follow_up_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Optional body of the complete operation: schedule the next call right away.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextFollowUp {
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub next_follow_up_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())
}

impl FollowUp {
    pub fn new(input: FollowUpInput, user: &AuthUser, now: DateTime<Utc>) -> Result<Self, CrmError> {
        if input.contact_id.trim().is_empty() {
            return Err(CrmError::InvalidInput("contact_id must not be empty".to_owned()));
        }
        Ok(Self {
            id: crate::new_id(),
            contact_id: input.contact_id.trim().to_owned(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            follow_up_date: input.follow_up_date,
            notes: clean_notes(input.notes),
            status: FollowUpStatus::Pending,
            notified: false,
            completed_at: None,
            previous_id: None,
            created_at: now,
        })
    }

    /// The follow-up scheduled by completing `self`, if `next` asks for one.
    #[must_use]
    pub fn chained(&self, next: NextFollowUp, user: &AuthUser, now: DateTime<Utc>) -> Option<Self> {
        let follow_up_date = next.next_follow_up_date?;
        Some(Self {
            id: crate::new_id(),
            contact_id: self.contact_id.clone(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            follow_up_date,
            notes: clean_notes(next.notes),
            status: FollowUpStatus::Pending,
            notified: false,
            completed_at: None,
            previous_id: Some(self.id.clone()),
            created_at: now,
        })
    }

    #[must_use]
    pub fn classify(&self, now: DateTime<Utc>) -> FollowUpState {
        match self.status {
            FollowUpStatus::Completed => FollowUpState::Completed,
            FollowUpStatus::Pending if self.follow_up_date < now => FollowUpState::Overdue,
            FollowUpStatus::Pending => FollowUpState::Upcoming,
        }
    }

    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.classify(now) == FollowUpState::Overdue
    }

    /// Pending, not yet notified and due before `now + window` (overdue included).
    #[must_use]
    pub fn needs_alert(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.status == FollowUpStatus::Pending
            && !self.notified
            && self.follow_up_date <= now + window
    }
}

/// Filter accepted by the plain follow-up listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpFilter {
    /// Stored status pending, overdue ones included
    Pending,
    Completed,
    /// Pending and past due
    Overdue,
}

impl FollowUpFilter {
    #[must_use]
    pub fn matches(&self, followup: &FollowUp, now: DateTime<Utc>) -> bool {
        match self {
            Self::Pending => followup.status == FollowUpStatus::Pending,
            Self::Completed => followup.status == FollowUpStatus::Completed,
            Self::Overdue => followup.is_overdue(now),
        }
    }
}

impl std::str::FromStr for FollowUpFilter {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            _ => Err(CrmError::invalid_value("status", s)),
        }
    }
}

/// Calendar window for the by-date and paginated listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Tomorrow,
    /// From the start of today through the end of the day a week out
    ThisWeek,
    #[default]
    All,
}

impl DateFilter {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "this_week",
            Self::All => "all",
        }
    }

    /// Inclusive `[start, end]` bounds, or `None` for no restriction.
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.date_naive();
        match self {
            Self::Today => Some((start_of_day(today), end_of_day(today))),
            Self::Tomorrow => {
                let tomorrow = (now + Duration::days(1)).date_naive();
                Some((start_of_day(tomorrow), end_of_day(tomorrow)))
            },
            Self::ThisWeek => {
                let week_out = (now + Duration::days(7)).date_naive();
                Some((start_of_day(today), end_of_day(week_out)))
            },
            Self::All => None,
        }
    }
}

impl std::fmt::Display for DateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DateFilter {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "this_week" | "this-week" | "week" => Ok(Self::ThisWeek),
            "all" | "" => Ok(Self::All),
            _ => Err(CrmError::invalid_value("date_filter", s)),
        }
    }
}

/// A follow-up as returned to clients: derived state plus its contact.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FollowUpView {
    #[serde(flatten)]
    pub followup: FollowUp,
    pub state: FollowUpState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

impl FollowUpView {
    #[must_use]
    pub fn new(followup: FollowUp, contact: Option<Contact>, now: DateTime<Utc>) -> Self {
        let state = followup.classify(now);
        Self { followup, state, contact }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UpcomingFollowUps {
    pub overdue: Vec<FollowUpView>,
    pub upcoming: Vec<FollowUpView>,
}

/// Split date-ordered views into all overdue ones and the first `cap` upcoming ones.
#[must_use]
pub fn partition_upcoming(views: Vec<FollowUpView>, cap: usize) -> UpcomingFollowUps {
    let mut out = UpcomingFollowUps::default();
    for view in views {
        match view.state {
            FollowUpState::Overdue => out.overdue.push(view),
            FollowUpState::Upcoming if out.upcoming.len() < cap => out.upcoming.push(view),
            FollowUpState::Upcoming | FollowUpState::Completed => {},
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone as _};

    fn user() -> AuthUser {
        AuthUser { id: "u1".to_owned(), email: "rep@example.com".to_owned() }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn followup_due(date: DateTime<Utc>) -> FollowUp {
        let input = FollowUpInput {
            contact_id: "c1".to_owned(),
            follow_up_date: date,
            notes: Some("  ".to_owned()),
        };
        FollowUp::new(input, &user(), date).unwrap()
    }

    #[test]
    fn past_pending_is_overdue_future_is_upcoming() {
        let now = at(2026, 10, 16, 12, 0);
        assert_eq!(followup_due(at(2026, 10, 16, 11, 59)).classify(now), FollowUpState::Overdue);
        assert_eq!(followup_due(now).classify(now), FollowUpState::Upcoming);
    }

    #[test]
    fn completed_is_never_overdue() {
        let now = at(2026, 10, 16, 12, 0);
        let mut f = followup_due(at(2020, 1, 1, 0, 0));
        f.status = FollowUpStatus::Completed;
        assert_eq!(f.classify(now), FollowUpState::Completed);
        assert!(!FollowUpFilter::Overdue.matches(&f, now));
    }

    #[test]
    fn blank_notes_are_dropped() {
        assert_eq!(followup_due(Utc::now()).notes, None);
    }

    #[test]
    fn chained_followup_links_previous() {
        let now = at(2026, 10, 16, 12, 0);
        let first = followup_due(now);
        let next = NextFollowUp {
            next_follow_up_date: Some(at(2026, 10, 20, 9, 0)),
            notes: Some("second call".to_owned()),
        };
        let second = first.chained(next, &user(), now).unwrap();
        assert_eq!(second.previous_id.as_deref(), Some(first.id.as_str()));
        assert_eq!(second.contact_id, first.contact_id);
        assert_eq!(second.status, FollowUpStatus::Pending);
        assert!(first.chained(NextFollowUp::default(), &user(), now).is_none());
    }

    #[test]
    fn alert_window_includes_overdue_and_skips_notified() {
        let now = at(2026, 10, 16, 12, 0);
        let window = Duration::minutes(30);
        assert!(followup_due(at(2026, 10, 16, 12, 29)).needs_alert(now, window));
        assert!(followup_due(at(2026, 10, 15, 8, 0)).needs_alert(now, window));
        assert!(!followup_due(at(2026, 10, 16, 12, 31)).needs_alert(now, window));
        let mut sent = followup_due(at(2026, 10, 16, 12, 10));
        sent.notified = true;
        assert!(!sent.needs_alert(now, window));
    }

    #[test]
    fn date_filter_windows() {
        let now = at(2026, 10, 16, 15, 30);
        let day = |d| NaiveDate::from_ymd_opt(2026, 10, d).unwrap();
        assert_eq!(DateFilter::Today.window(now), Some((start_of_day(day(16)), end_of_day(day(16)))));
        assert_eq!(
            DateFilter::Tomorrow.window(now),
            Some((start_of_day(day(17)), end_of_day(day(17))))
        );
        assert_eq!(
            DateFilter::ThisWeek.window(now),
            Some((start_of_day(day(16)), end_of_day(day(23))))
        );
        assert_eq!(DateFilter::All.window(now), None);
    }

    #[test]
    fn unknown_date_filter_is_rejected() {
        assert_eq!("this_week".parse::<DateFilter>().unwrap(), DateFilter::ThisWeek);
        assert!("yesterday".parse::<DateFilter>().is_err());
    }

    #[test]
    fn partition_caps_upcoming_only() {
        let now = at(2026, 10, 16, 12, 0);
        let mut views = Vec::new();
        for i in 0..3 {
            views.push(FollowUpView::new(followup_due(now - Duration::hours(i + 1)), None, now));
        }
        for i in 0..5 {
            views.push(FollowUpView::new(followup_due(now + Duration::hours(i + 1)), None, now));
        }
        let split = partition_upcoming(views, 2);
        assert_eq!(split.overdue.len(), 3);
        assert_eq!(split.upcoming.len(), 2);
    }

    #[test]
    fn view_serializes_flat_with_state() {
        let now = at(2026, 10, 16, 12, 0);
        let view = FollowUpView::new(followup_due(now - Duration::days(1)), None, now);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "overdue");
        assert_eq!(json["status"], "pending");
        assert!(json.get("contact").is_none());
    }
}
