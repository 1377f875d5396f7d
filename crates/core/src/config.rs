//! Process configuration read from the environment.

use std::path::PathBuf;

use crate::constants::{
    DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_JWT_SECRET, DEFAULT_REMINDER_INTERVAL_SECS,
    DEFAULT_REMINDER_WINDOW_MINUTES, DEFAULT_SMTP_PORT, MAX_JWT_EXPIRATION_HOURS,
};
use crate::env_config::{env_list, env_non_empty, env_parse_with_default};

/// Outbound mail settings. Present only when `SMTP_HOST` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl SmtpConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let host = env_non_empty("SMTP_HOST")?;
        let username = env_non_empty("SMTP_USER");
        let from = env_non_empty("SMTP_FROM")
            .or_else(|| username.clone())
            .unwrap_or_else(|| format!("smartcrm@{host}"));
        Some(Self {
            port: env_parse_with_default("SMTP_PORT", DEFAULT_SMTP_PORT),
            password: env_non_empty("SMTP_PASS"),
            username,
            from,
            host,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_owned(),
            token_ttl_hours: DEFAULT_JWT_EXPIRATION_HOURS,
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let jwt_secret = env_non_empty("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the insecure development default");
            DEFAULT_JWT_SECRET.to_owned()
        });
        let token_ttl_hours =
            env_parse_with_default("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS)
                .clamp(1, MAX_JWT_EXPIRATION_HOURS);
        Self { jwt_secret, token_ttl_hours }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderConfig {
    pub interval_secs: u64,
    pub window_minutes: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REMINDER_INTERVAL_SECS,
            window_minutes: DEFAULT_REMINDER_WINDOW_MINUTES,
        }
    }
}

impl ReminderConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            interval_secs: env_parse_with_default(
                "REMINDER_INTERVAL_SECS",
                DEFAULT_REMINDER_INTERVAL_SECS,
            )
            .max(1),
            window_minutes: env_parse_with_default(
                "REMINDER_WINDOW_MINUTES",
                DEFAULT_REMINDER_WINDOW_MINUTES,
            )
            .max(0),
        }
    }
}

/// Everything the server needs from its environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `postgres://...` selects the PostgreSQL backend; otherwise SQLite at `db_path`.
    pub database_url: Option<String>,
    pub db_path: PathBuf,
    pub auth: AuthConfig,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub smtp: Option<SmtpConfig>,
    pub reminders: ReminderConfig,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let cors_origins = env_list("CORS_ORIGINS").into_iter().filter(|o| o != "*").collect();
        Self {
            database_url: env_non_empty("DATABASE_URL"),
            db_path: env_non_empty("SMARTCRM_DB_PATH").map_or_else(default_db_path, PathBuf::from),
            auth: AuthConfig::from_env(),
            cors_origins,
            smtp: SmtpConfig::from_env(),
            reminders: ReminderConfig::from_env(),
        }
    }

    /// True when `DATABASE_URL` points at PostgreSQL.
    #[must_use]
    pub fn uses_postgres(&self) -> bool {
        self.database_url
            .as_deref()
            .is_some_and(|url| url.starts_with("postgres://") || url.starts_with("postgresql://"))
    }
}

#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smartcrm")
        .join("crm.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_db_path_ends_in_crm_db() {
        let path = default_db_path();
        assert!(path.ends_with("smartcrm/crm.db"));
    }

    #[test]
    fn postgres_detection() {
        let mut cfg = AppConfig {
            database_url: Some("postgresql://crm@localhost/crm".to_owned()),
            db_path: PathBuf::from("crm.db"),
            auth: AuthConfig::default(),
            cors_origins: Vec::new(),
            smtp: None,
            reminders: ReminderConfig::default(),
        };
        assert!(cfg.uses_postgres());
        cfg.database_url = Some("sqlite://crm.db".to_owned());
        assert!(!cfg.uses_postgres());
        cfg.database_url = None;
        assert!(!cfg.uses_postgres());
    }
}
