//! Client-side follow-up watcher.
//!
//! Polls `/api/followups/upcoming` and raises one alert per overdue
//! follow-up for the lifetime of the process. Nothing is persisted; a failed
//! poll is logged and retried on the next tick.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use smartcrm_core::Contact;

pub(crate) enum WatchAuth {
    Token(String),
    Login { email: String, password: String },
}

impl WatchAuth {
    pub(crate) fn from_args(
        token: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        match (token, email, password) {
            (Some(token), _, _) => Ok(Self::Token(token)),
            (None, Some(email), Some(password)) => Ok(Self::Login { email, password }),
            _ => bail!("provide --token, or --email and --password, to watch follow-ups"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct OverdueFollowUp {
    id: String,
    follow_up_date: DateTime<Utc>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    contact: Option<Contact>,
}

#[derive(Debug, Deserialize)]
struct UpcomingResponse {
    overdue: Vec<OverdueFollowUp>,
}

/// Remembers which follow-ups were already alerted in this process.
#[derive(Debug, Default)]
struct AlertTracker {
    seen: HashSet<String>,
}

impl AlertTracker {
    /// Overdue follow-ups not alerted before, marking them as alerted.
    fn fresh<'a>(&mut self, overdue: &'a [OverdueFollowUp]) -> Vec<&'a OverdueFollowUp> {
        overdue.iter().filter(|f| self.seen.insert(f.id.clone())).collect()
    }
}

fn alert_line(followup: &OverdueFollowUp, now: DateTime<Utc>) -> String {
    let late = now.signed_duration_since(followup.follow_up_date);
    let who = followup.contact.as_ref().map_or_else(
        || "unknown contact".to_owned(),
        |c| format!("{} ({}, {})", c.customer_label(), c.shop_label(), c.phone),
    );
    let mut line = format!(
        "OVERDUE follow-up with {who}, due {} ({}h {}m ago)",
        followup.follow_up_date.format("%Y-%m-%d %H:%M UTC"),
        late.num_hours(),
        late.num_minutes() % 60
    );
    if let Some(notes) = &followup.notes {
        line.push_str(" - ");
        line.push_str(notes);
    }
    line
}

struct Watcher {
    client: reqwest::Client,
    endpoint: String,
    auth: WatchAuth,
    token: Option<String>,
}

impl Watcher {
    async fn login(&mut self) -> Result<String> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        let token = match &self.auth {
            WatchAuth::Token(token) => token.clone(),
            WatchAuth::Login { email, password } => {
                let resp = self
                    .client
                    .post(format!("{}/api/auth/login", self.endpoint))
                    .json(&serde_json::json!({"email": email, "password": password}))
                    .send()
                    .await?
                    .error_for_status()
                    .context("login rejected")?;
                let body: LoginResponse = resp.json().await?;
                tracing::info!("Logged in to {}", self.endpoint);
                body.token
            },
        };
        self.token = Some(token.clone());
        Ok(token)
    }

    async fn poll(&mut self) -> Result<UpcomingResponse> {
        let token = self.login().await?;
        let resp = self
            .client
            .get(format!("{}/api/followups/upcoming", self.endpoint))
            .bearer_auth(token)
            .send()
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            self.token = None;
            bail!("session expired, logging in again on the next poll");
        }
        Ok(resp.error_for_status()?.json().await?)
    }
}

pub(crate) async fn run(endpoint: String, auth: WatchAuth, interval_secs: u64) -> Result<()> {
    let mut watcher = Watcher {
        client: reqwest::Client::new(),
        endpoint: endpoint.trim_end_matches('/').to_owned(),
        auth,
        token: None,
    };
    let mut tracker = AlertTracker::default();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tracing::info!(endpoint = %watcher.endpoint, interval_secs, "Watching follow-ups");

    loop {
        ticker.tick().await;
        match watcher.poll().await {
            Ok(upcoming) => {
                let now = Utc::now();
                for followup in tracker.fresh(&upcoming.overdue) {
                    println!("{}", alert_line(followup, now));
                    tracing::info!(followup = %followup.id, "overdue follow-up alert");
                }
            },
            Err(e) => tracing::warn!(error = %e, "follow-up poll failed"),
        }
    }
}
