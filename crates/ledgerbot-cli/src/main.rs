//! ledgerbot entry point: load config, resolve credentials, wire the
//! collaborators, and run the event loop.

mod config;

use clap::Parser;
use config::{BotConfig, Credentials};
use ledgerbot_bot::ExpenseController;
use ledgerbot_channels::{Channel, TelegramChannel};
use ledgerbot_drive::{BlobStore, DriveStore};
use ledgerbot_session::PendingStore;
use ledgerbot_sheets::{Ledger, SheetsLedger};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "ledgerbot", about = "ledgerbot — Telegram expense bot writing to a shared ledger")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "ledgerbot.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let config: BotConfig = toml::from_str(&config_str)?;
    let credentials = Credentials::resolve(&config.credentials)?;

    let sessions = Arc::new(PendingStore::new(Duration::from_secs(
        config.pending_ttl_minutes * 60,
    )));
    let ledger: Arc<dyn Ledger> = Arc::new(SheetsLedger::new(
        credentials.google_token.clone(),
        config.spreadsheet_id.clone(),
        config.worksheet.clone(),
    )?);
    let blobs: Arc<dyn BlobStore> = Arc::new(DriveStore::new(
        credentials.google_token.clone(),
        config.drive_folder_id.clone(),
    )?);

    let mut telegram = TelegramChannel::new(credentials.telegram_token.clone(), config.event_buffer);
    let mut events = telegram
        .take_event_receiver()
        .ok_or_else(|| anyhow::anyhow!("event receiver already taken"))?;
    let telegram = Arc::new(telegram);
    let channel: Arc<dyn Channel> = telegram.clone();

    let controller = ExpenseController::new(sessions.clone(), ledger, blobs, channel);

    // Periodic sweep of expired pending sessions; take() also expires
    // lazily, this just keeps the store from accumulating abandoned ones.
    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sweeper.sweep();
            if removed > 0 {
                debug!(removed, "Expired pending sessions swept");
            }
        }
    });

    // The poller retries failed polls itself, keeping its update offset,
    // and returns only once the event receiver is dropped.
    let poller = telegram.clone();
    let poll_task = tokio::spawn(async move {
        poller.poll_updates().await;
    });

    info!(
        worksheet = %config.worksheet,
        ttl_minutes = config.pending_ttl_minutes,
        "ledgerbot running"
    );

    // One event at a time: the channel delivers per-conversation events in
    // arrival order and sequential dispatch keeps it that way, so a receipt
    // can never be matched against a session created by a later message.
    while let Some(event) = events.recv().await {
        controller.handle_event(event).await;
    }

    poll_task.abort();
    Ok(())
}
