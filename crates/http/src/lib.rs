//! HTTP API server for SmartCRM.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(missing_copy_implementations, reason = "Types may grow")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod auth;
mod handlers;
mod query_types;
mod response_types;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use smartcrm_core::{AppConfig, MAX_UPLOAD_BYTES};
use smartcrm_service::{
    ActivityService, AuthService, ContactService, DemoService, FollowUpService, ImportService,
    LogNotifier, MeetingService, NoteService, Notifier, ReminderService, ServiceError,
    SmtpNotifier,
};
use smartcrm_storage::StorageBackend;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use auth::CurrentUser;
pub use response_types::VersionResponse;
pub use scheduler::start_reminder_scheduler;

/// Shared application state for all HTTP handlers.
///
/// Wrapped in `Arc` for sharing across handlers and the reminder task.
pub struct AppState {
    /// `sqlite` or `postgres`, reported by the version endpoint
    pub backend: &'static str,
    /// Allowed CORS origins; empty means any
    pub cors_origins: Vec<String>,
    pub reminder_interval: Duration,
    pub auth_service: Arc<AuthService>,
    pub activity_service: Arc<ActivityService>,
    pub contact_service: Arc<ContactService>,
    pub import_service: Arc<ImportService>,
    pub note_service: Arc<NoteService>,
    pub followup_service: Arc<FollowUpService>,
    pub meeting_service: Arc<MeetingService>,
    pub demo_service: Arc<DemoService>,
    pub reminder_service: Arc<ReminderService>,
}

impl AppState {
    /// Wire every service onto one storage backend. Reminders go out by
    /// SMTP when configured and are only logged otherwise.
    pub fn new(storage: Arc<StorageBackend>, config: &AppConfig) -> Result<Self, ServiceError> {
        let notifier: Arc<dyn Notifier> = match &config.smtp {
            Some(smtp) => {
                tracing::info!(host = %smtp.host, port = smtp.port, "SMTP reminders enabled");
                Arc::new(SmtpNotifier::new(smtp)?)
            },
            None => {
                tracing::info!("SMTP_HOST not set, reminders will only be logged");
                Arc::new(LogNotifier)
            },
        };
        let activity = Arc::new(ActivityService::new(Arc::clone(&storage)));
        Ok(Self {
            backend: storage.kind(),
            cors_origins: config.cors_origins.clone(),
            reminder_interval: Duration::from_secs(config.reminders.interval_secs),
            auth_service: Arc::new(AuthService::new(Arc::clone(&storage), &config.auth)),
            contact_service: Arc::new(ContactService::new(Arc::clone(&storage), Arc::clone(&activity))),
            import_service: Arc::new(ImportService::new(Arc::clone(&storage), Arc::clone(&activity))),
            note_service: Arc::new(NoteService::new(Arc::clone(&storage), Arc::clone(&activity))),
            followup_service: Arc::new(FollowUpService::new(Arc::clone(&storage), Arc::clone(&activity))),
            meeting_service: Arc::new(MeetingService::new(Arc::clone(&storage), Arc::clone(&activity))),
            demo_service: Arc::new(DemoService::new(Arc::clone(&storage), Arc::clone(&activity))),
            reminder_service: Arc::new(ReminderService::new(storage, notifier, &config.reminders)),
            activity_service: activity,
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                    None
                },
            })
            .collect();
        AllowOrigin::list(parsed)
    };
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([header::CONTENT_TYPE])
}

pub fn create_router(state: Arc<AppState>) -> Router {
    use handlers::{activity, auth, contacts, demos, followups, imports, meetings, notes};

    let cors = cors_layer(&state.cors_origins);
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/contacts/preview", post(imports::preview))
        .route("/api/contacts/import", post(imports::import))
        .route("/api/contacts/count", get(contacts::count_contacts))
        .route("/api/contacts", get(contacts::list_contacts).post(contacts::create_contact))
        .route(
            "/api/contacts/{id}",
            get(contacts::get_contact).put(contacts::update_contact).delete(contacts::delete_contact),
        )
        .route("/api/contacts/{id}/call", post(contacts::record_call))
        .route("/api/contacts/{id}/demos", get(contacts::demo_history))
        .route("/api/notes", post(notes::create_note))
        .route("/api/notes/contact/{id}", get(notes::notes_for_contact))
        .route("/api/followups", get(followups::list_followups).post(followups::create_followup))
        .route("/api/followups/upcoming", get(followups::upcoming_followups))
        .route("/api/followups/by-date", get(followups::followups_by_date))
        .route("/api/followups/paginated", get(followups::paginated_followups))
        .route("/api/followups/{id}/complete", put(followups::complete_followup))
        .route("/api/activity-logs", get(activity::list_activity))
        .route("/api/meetings", get(meetings::list_meetings).post(meetings::create_meeting))
        .route(
            "/api/meetings/{id}",
            get(meetings::get_meeting).put(meetings::update_meeting).delete(meetings::delete_meeting),
        )
        .route("/api/meetings/{id}/status", put(meetings::set_meeting_status))
        .route("/api/demos", post(demos::give_demo))
        .route("/api/demos/{id}/watched", put(demos::mark_watched))
        .route("/api/demos/report", get(demos::demo_report))
        .route("/api/demos/summary", get(demos::demo_summary))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version(State(state): State<Arc<AppState>>) -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION"), backend: state.backend })
}
