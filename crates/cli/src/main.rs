use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use smartcrm_core::{AppConfig, DEFAULT_POLL_INTERVAL_SECS};
use smartcrm_storage::StorageBackend;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "smartcrm")]
#[command(about = "Small-business CRM: contacts, Excel import, follow-ups, meetings and demos", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API and the reminder scheduler
    Serve {
        #[arg(short, long, default_value = "8000", env = "SMARTCRM_PORT")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SMARTCRM_HOST")]
        host: String,
    },
    /// Run a single reminder pass and exit
    Remind,
    /// Poll a running server and alert on overdue follow-ups
    Watch {
        #[arg(long, default_value = "http://127.0.0.1:8000", env = "SMARTCRM_ENDPOINT")]
        endpoint: String,
        #[arg(long, env = "SMARTCRM_TOKEN", hide_env_values = true)]
        token: Option<String>,
        #[arg(long, env = "SMARTCRM_EMAIL")]
        email: Option<String>,
        #[arg(long, env = "SMARTCRM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Seconds between polls
        #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
        interval: u64,
    },
}

/// Open the backend `DATABASE_URL` selects: PostgreSQL for `postgres://`
/// URLs, SQLite at `SMARTCRM_DB_PATH` otherwise.
pub(crate) async fn open_storage(config: &AppConfig) -> Result<Arc<StorageBackend>> {
    if config.uses_postgres() {
        #[cfg(feature = "postgres")]
        {
            let url = config.database_url.as_deref().unwrap_or_default();
            tracing::info!("Using PostgreSQL backend");
            return Ok(Arc::new(StorageBackend::new_postgres(url).await?));
        }
        #[cfg(not(feature = "postgres"))]
        anyhow::bail!("DATABASE_URL points at PostgreSQL but this build lacks the `postgres` feature");
    }
    tracing::info!(path = %config.db_path.display(), "Using SQLite backend");
    Ok(Arc::new(StorageBackend::new_sqlite(&config.db_path)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: failed to load .env: {e}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(&host, port).await,
        Commands::Remind => commands::remind::run().await,
        Commands::Watch { endpoint, token, email, password, interval } => {
            let auth = commands::watch::WatchAuth::from_args(token, email, password)?;
            commands::watch::run(endpoint, auth, interval).await
        },
    }
}
