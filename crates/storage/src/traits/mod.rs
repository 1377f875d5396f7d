//! Storage backend trait abstraction
//!
//! Async domain traits implemented by both the SQLite and the PostgreSQL
//! backend, and by [`crate::StorageBackend`] through enum dispatch.

pub mod contact;
pub mod followup;
pub mod misc;
pub mod schedule;
pub mod user;

pub use contact::ContactStore;
pub use followup::FollowUpStore;
pub use misc::{ActivityStore, NoteStore};
pub use schedule::{DemoStore, MeetingStore};
pub use user::UserStore;

/// Every store trait; what the service layer is generic over.
pub trait CrmStore:
    UserStore + ContactStore + NoteStore + FollowUpStore + MeetingStore + DemoStore + ActivityStore
{
}

impl<T> CrmStore for T where
    T: UserStore
        + ContactStore
        + NoteStore
        + FollowUpStore
        + MeetingStore
        + DemoStore
        + ActivityStore
{
}
