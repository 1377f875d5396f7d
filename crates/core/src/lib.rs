//! Core types for SmartCRM
//!
//! Domain types shared across all other crates, plus the pure logic that
//! does not need storage: follow-up classification, import planning and
//! demo statistics.

mod activity;
mod config;
mod constants;
mod contact;
mod demo;
mod env_config;
mod error;
mod followup;
pub mod import;
mod meeting;
mod note;
mod time;
mod user;

pub use activity::*;
pub use config::*;
pub use constants::*;
pub use contact::*;
pub use demo::*;
pub use env_config::*;
pub use error::*;
pub use followup::*;
pub use meeting::*;
pub use note::*;
pub use time::*;
pub use user::*;

/// Fresh random identifier for a new entity.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
