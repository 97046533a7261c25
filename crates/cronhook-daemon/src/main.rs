use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use cronhook_core::CronhookConfig;
use cronhook_dispatch::RequestDispatcher;
use cronhook_scheduler::{
    DispatchingExecutor, SchedulerEngine, SqliteJobStore, TickTimerService,
};

mod app;

#[derive(Parser)]
#[command(name = "cronhook-daemon", about = "Durable cron scheduler for HTTP calls")]
struct Args {
    /// Path to cronhook.toml (defaults to ~/.cronhook/cronhook.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cronhook=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = CronhookConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        CronhookConfig::default()
    });

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    cronhook_scheduler::db::init_db(&db)?;
    drop(db);

    // Each subsystem gets its own connection for thread safety.
    let store = Arc::new(SqliteJobStore::new(rusqlite::Connection::open(db_path)?)?);

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(256);
    let timers = Arc::new(TickTimerService::new(events_tx));

    let dispatcher = RequestDispatcher::new(Duration::from_secs(config.http.timeout_secs))?;
    let executor = Arc::new(DispatchingExecutor::new(
        dispatcher,
        rusqlite::Connection::open(db_path)?,
    ));

    let engine = Arc::new(SchedulerEngine::new(store, timers, executor));

    // Reattach persisted jobs to live timers before anything can fire.
    let restored = engine.restore_jobs()?;
    info!(count = restored, "restart recovery complete");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(Arc::clone(&engine).run(events_rx, shutdown_rx));

    let state = Arc::new(app::AppState { engine });
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.admin.bind, config.admin.port).parse()?;
    info!("cronhook admin API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    let _ = shutdown_tx.send(true);
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
