use std::sync::Arc;

use anyhow::Result;
use smartcrm_core::AppConfig;
use smartcrm_http::{AppState, create_router, start_reminder_scheduler};

use crate::open_storage;

pub(crate) async fn run(host: &str, port: u16) -> Result<()> {
    let config = AppConfig::from_env();
    let storage = open_storage(&config).await?;
    let state = Arc::new(AppState::new(storage, &config)?);

    start_reminder_scheduler(Arc::clone(&state.reminder_service), state.reminder_interval);

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
