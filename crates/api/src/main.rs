//! LiveSync - presence and offline-sync coordinator
//!
//! Runs the coordinators against the in-memory adapters for one session
//! until interrupted.

use anyhow::Context;
use livesync_domain::{AuthEvent, SessionId};
use livesync_infra::config;
use livesync_lib::utils::logging::{error_label, init_tracing, log_manual_sync};
use livesync_lib::AppContext;
use tracing::{error, info, warn};

const SESSION_ENV: &str = "LIVESYNC_SESSION_ID";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so it can set the log filter and format
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    let config = config::load().context("failed to load configuration")?;
    let ctx = AppContext::new_with_config(config).map_err(|err| {
        error!(error_type = error_label(&err), error = %err, "context initialisation failed");
        err
    })?;

    let (auth_events, driver) = ctx.drive_auth_events();
    ctx.set_transport(true);

    let mut summaries = ctx.subscribe_sync_summaries();
    tokio::spawn(async move {
        while let Ok(summary) = summaries.recv().await {
            info!(synced = summary.synced, failed = summary.failed, "sync completed");
        }
    });

    match std::env::var(SESSION_ENV) {
        Ok(raw) => {
            let session = SessionId::new(raw).with_context(|| format!("invalid {SESSION_ENV}"))?;
            auth_events.send(AuthEvent::SignedIn(session)).await.context("lifecycle bridge stopped early")?;
        }
        Err(_) => warn!("{SESSION_ENV} not set; waiting for shutdown without a session"),
    }

    info!("LiveSync running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;

    log_manual_sync(&ctx.sync_now().await);
    ctx.shutdown().await?;
    drop(auth_events);
    driver.await.context("lifecycle bridge task failed")?;

    info!("LiveSync stopped");
    Ok(())
}
