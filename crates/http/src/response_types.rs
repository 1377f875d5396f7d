//! Response types (Serialize)

use chrono::{DateTime, Utc};
use serde::Serialize;
use smartcrm_core::{FollowUpView, User};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CallResponse {
    pub message: &'static str,
    pub call_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FollowUpsByDate {
    pub filter: &'static str,
    pub count: usize,
    pub followups: Vec<FollowUpView>,
}

#[derive(Debug, Serialize)]
#[non_exhaustive]
pub struct VersionResponse {
    pub version: &'static str,
    pub backend: &'static str,
}
