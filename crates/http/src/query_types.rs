//! Request/query types (Deserialize)

use serde::Deserialize;
use smartcrm_core::{DEFAULT_FOLLOWUP_PAGE_SIZE, DEFAULT_LIST_LIMIT, MAX_QUERY_LIMIT};

const fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

const fn default_followup_page() -> usize {
    DEFAULT_FOLLOWUP_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ContactListQuery {
    /// Cap limit to prevent unbounded queries.
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl PaginationQuery {
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct FollowUpListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateFilterQuery {
    #[serde(default)]
    pub date_filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FollowUpPageQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_followup_page")]
    pub limit: usize,
    #[serde(default)]
    pub date_filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MeetingListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MeetingStatusRequest {
    pub status: String,
}

/// `start` and `end` accept RFC 3339, a naive date-time or a bare date.
#[derive(Debug, Deserialize)]
pub struct DemoRangeQuery {
    pub start: String,
    pub end: String,
    pub group_by: Option<String>,
}
