//! Product demos and their given/watched conversion statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CrmError;
use crate::time::deserialize_opt_timestamp;
use crate::user::AuthUser;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Demo {
    pub id: String,
    pub contact_id: String,
    pub user_id: String,
    pub user_email: String,
    pub given_at: DateTime<Utc>,
    pub watched: bool,
    pub watched_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoInput {
    pub contact_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoWatch {
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub watched_at: Option<DateTime<Utc>>,
}

impl Demo {
    #[must_use]
    pub fn new(input: DemoInput, user: &AuthUser, now: DateTime<Utc>) -> Self {
        Self {
            id: crate::new_id(),
            contact_id: input.contact_id,
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            given_at: now,
            watched: false,
            watched_at: None,
            notes: input.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Still waiting to be watched.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.watched
    }
}

/// Bucket size for the demo report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DemoGrouping {
    #[default]
    Day,
    /// Sunday-based week number, `YYYY-WW`
    Week,
    Month,
}

impl DemoGrouping {
    #[must_use]
    pub fn period_key(&self, at: DateTime<Utc>) -> String {
        let fmt = match self {
            Self::Day => "%Y-%m-%d",
            Self::Week => "%Y-%U",
            Self::Month => "%Y-%m",
        };
        at.format(fmt).to_string()
    }
}

impl std::str::FromStr for DemoGrouping {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(CrmError::invalid_value("group_by", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DemoStats {
    pub given: u64,
    pub watched: u64,
    /// watched / given, rounded to three decimals; 0 when nothing was given
    pub conversion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemoPeriodStats {
    pub period: String,
    pub given: u64,
    pub watched: u64,
    pub conversion: f64,
}

#[expect(clippy::cast_precision_loss, reason = "demo counts are far below 2^52")]
fn conversion(given: u64, watched: u64) -> f64 {
    if given == 0 {
        return 0.0;
    }
    let ratio = watched as f64 / given as f64;
    (ratio * 1000.0).round() / 1000.0
}

fn tally<'a>(demos: impl IntoIterator<Item = &'a Demo>) -> (u64, u64) {
    demos.into_iter().fold((0, 0), |(given, watched), d| (given + 1, watched + u64::from(d.watched)))
}

/// Totals over every demo passed in.
#[must_use]
pub fn summarize(demos: &[Demo]) -> DemoStats {
    let (given, watched) = tally(demos);
    DemoStats { given, watched, conversion: conversion(given, watched) }
}

/// Per-period totals keyed on `given_at`, ordered by period.
#[must_use]
pub fn report(demos: &[Demo], grouping: DemoGrouping) -> Vec<DemoPeriodStats> {
    let mut buckets: BTreeMap<String, Vec<&Demo>> = BTreeMap::new();
    for demo in demos {
        buckets.entry(grouping.period_key(demo.given_at)).or_default().push(demo);
    }
    buckets
        .into_iter()
        .map(|(period, bucket)| {
            let (given, watched) = tally(bucket);
            DemoPeriodStats { period, given, watched, conversion: conversion(given, watched) }
        })
        .collect()
}
