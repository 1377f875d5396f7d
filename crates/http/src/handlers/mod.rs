#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod activity;
pub mod auth;
pub mod contacts;
pub mod demos;
pub mod followups;
pub mod imports;
pub mod meetings;
pub mod notes;

use std::str::FromStr;

use smartcrm_core::CrmError;

use crate::api_error::ApiError;

/// Parse an optional query parameter. Absent or blank means no filter.
fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = CrmError>,
{
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::parse).transpose().map_err(ApiError::from)
}
