//! PostgreSQL schema migrations for SmartCRM storage.

use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS contacts (
        id TEXT PRIMARY KEY,
        phone TEXT NOT NULL UNIQUE,
        customer_name TEXT,
        status TEXT NOT NULL DEFAULT 'None',
        data JSONB NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        last_call_at TIMESTAMPTZ
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_contacts_created ON contacts (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_contacts_status ON contacts (status)",
    r"
    CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        contact_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_notes_contact ON notes (contact_id)",
    r"
    CREATE TABLE IF NOT EXISTS follow_ups (
        id TEXT PRIMARY KEY,
        contact_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        user_email TEXT NOT NULL,
        follow_up_date TIMESTAMPTZ NOT NULL,
        notes TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        notified BOOLEAN NOT NULL DEFAULT FALSE,
        completed_at TIMESTAMPTZ,
        previous_id TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_follow_ups_date ON follow_ups (follow_up_date)",
    "CREATE INDEX IF NOT EXISTS idx_follow_ups_pending ON follow_ups (status, notified, follow_up_date)",
    r"
    CREATE TABLE IF NOT EXISTS meetings (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        user_email TEXT NOT NULL,
        title TEXT NOT NULL,
        date DATE NOT NULL,
        time TEXT,
        location TEXT,
        notes TEXT,
        attendees JSONB NOT NULL DEFAULT '[]',
        status TEXT NOT NULL DEFAULT 'scheduled',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meetings_user_date ON meetings (user_id, date)",
    r"
    CREATE TABLE IF NOT EXISTS demos (
        id TEXT PRIMARY KEY,
        contact_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        user_email TEXT NOT NULL,
        given_at TIMESTAMPTZ NOT NULL,
        watched BOOLEAN NOT NULL DEFAULT FALSE,
        watched_at TIMESTAMPTZ,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_demos_contact ON demos (contact_id)",
    "CREATE INDEX IF NOT EXISTS idx_demos_given ON demos (given_at)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_demos_one_active ON demos (contact_id) WHERE NOT watched",
    r"
    CREATE TABLE IF NOT EXISTS activity_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        user_email TEXT NOT NULL,
        action TEXT NOT NULL,
        target TEXT,
        details TEXT,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_activity_timestamp ON activity_logs (timestamp DESC)",
];

/// Run all PostgreSQL migrations. Every statement is idempotent.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(statements = STATEMENTS.len(), "PostgreSQL schema up to date");
    Ok(())
}
