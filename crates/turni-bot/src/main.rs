use std::sync::Arc;

use teloxide::Bot;
use tracing::info;

use turni_core::config::TurniConfig;
use turni_core::transport::ChatTransport;
use turni_router::Router;
use turni_scheduler::ReminderScheduler;
use turni_sessions::SessionStore;
use turni_shifts::ShiftTable;
use turni_telegram::{TelegramAdapter, TelegramTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turni=info,turni_bot=info".into()),
        )
        .init();

    // load config: explicit TURNI_CONFIG path > ./turni.toml
    let config_path = std::env::var("TURNI_CONFIG").ok();
    let config = TurniConfig::load(config_path.as_deref())?;

    // Shift table first: a missing or unparseable table is fatal — the bot
    // must not start serving events without shift data.
    let table = Arc::new(ShiftTable::load(&config.shifts.path)?);

    info!(path = %config.database.path, "opening SQLite database");
    let db = rusqlite::Connection::open(&config.database.path)?;
    // FULL sync: a crash loses at most the in-flight write, never prior state.
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
    turni_sessions::db::init_db(&db)?;
    let sessions = Arc::new(SessionStore::new(db));

    // Fired-job channel: engine → delivery task.
    let (fired_tx, fired_rx) = tokio::sync::mpsc::channel(256);
    let scheduler = Arc::new(ReminderScheduler::new(fired_tx));

    // Re-establish every persisted reminder before accepting events.
    scheduler.rehydrate_all(sessions.load_all()?.iter());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(Arc::clone(&scheduler).run(shutdown_rx));

    let bot = Bot::new(&config.bot.token);
    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));

    tokio::spawn(turni_router::notify::run_reminder_delivery(
        fired_rx,
        Arc::clone(&sessions),
        Arc::clone(&table),
        Arc::clone(&transport),
    ));

    let router = Arc::new(Router::new(
        sessions,
        table,
        Arc::clone(&scheduler),
        transport,
        config.access.clone(),
        config.bot.name.clone(),
    ));

    TelegramAdapter::new(bot, router).run().await;

    // The dispatcher only returns on process shutdown.
    let _ = shutdown_tx.send(true);
    Ok(())
}
