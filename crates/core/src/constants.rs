//! Shared constants for SmartCRM.
//!
//! Centralizes magic numbers used by more than one crate.

/// Maximum number of results for any list query (DoS protection).
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Default page size for contact and activity-log listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Default page size for the paginated follow-up listing.
pub const DEFAULT_FOLLOWUP_PAGE_SIZE: usize = 20;

/// How many upcoming (not yet overdue) follow-ups the dashboard receives.
pub const UPCOMING_FOLLOWUPS_CAP: usize = 20;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// SQLite connection pool size.
pub const SQLITE_POOL_MAX_CONNECTIONS: u32 = 8;

/// Lifetime of an issued access token.
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Longest accepted token lifetime, about ten years.
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 366 * 10;

/// Fallback signing secret. Only acceptable for local development.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Server-side reminder scan period.
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 300;

/// Follow-ups due within this many minutes get a reminder e-mail.
pub const DEFAULT_REMINDER_WINDOW_MINUTES: i64 = 30;

/// Client-side poller period.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Number of data rows returned by the import preview.
pub const IMPORT_PREVIEW_ROWS: usize = 5;

/// Upload size cap for workbook uploads (bytes).
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Length cap for the shop-name part of a generated contact key.
pub const GENERATED_KEY_SHOP_CHARS: usize = 15;

/// Cell values treated as "no value" during import.
pub const NULL_TOKENS: &[&str] = &["", "n/a", "na", "null", "none", "nan"];

/// Attribute keys that may hold a shop name, in lookup order.
pub const SHOP_NAME_KEYS: &[&str] = &["shop_name", "Shop_Name", "Shop Name", "shop", "Shop"];

/// Fallback label when a contact has no shop name.
pub const UNKNOWN_SHOP: &str = "Unknown Shop";

/// Fallback label when a contact has no customer name.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";
