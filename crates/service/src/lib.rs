//! Service layer for SmartCRM
//!
//! Business rules between the HTTP handlers and storage: authentication,
//! contact bookkeeping, spreadsheet import, follow-up scheduling, meetings,
//! demos and reminder delivery. Every mutation writes one activity entry.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod activity_service;
mod auth_service;
mod contact_service;
mod demo_service;
mod error;
mod followup_service;
mod import_service;
mod meeting_service;
mod note_service;
mod reminder_service;
#[cfg(test)]
mod test_support;

pub use activity_service::ActivityService;
pub use auth_service::{AuthService, AuthSession, Claims};
pub use contact_service::ContactService;
pub use demo_service::DemoService;
pub use error::ServiceError;
pub use followup_service::{CompletedFollowUp, FollowUpService};
pub use import_service::ImportService;
pub use meeting_service::MeetingService;
pub use note_service::NoteService;
pub use reminder_service::{LogNotifier, Notifier, ReminderService, SmtpNotifier};
