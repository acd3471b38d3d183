use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moneta_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > MONETA_CONFIG env > ~/.moneta/moneta.toml
    let config_path = std::env::var("MONETA_CONFIG").ok();
    let config =
        moneta_core::config::MonetaConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            moneta_core::config::MonetaConfig::default()
        });

    if config.gateway.cron_secret.is_none() {
        tracing::warn!("gateway.cron_secret is not set — all cron triggers will be rejected");
    }

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    // initialize SQLite database — single file for all stores
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    // run all schema migrations (idempotent)
    moneta_store::db::init_db(&db)?;
    info!("database migrations complete");

    // build stores — each gets its own connection for thread safety
    let plans = Arc::new(moneta_store::SqlitePlanStore::new(
        rusqlite::Connection::open(db_path)?,
    ));
    let ledger = Arc::new(moneta_store::SqliteLedger::new(rusqlite::Connection::open(
        db_path,
    )?));
    let subscriptions = Arc::new(moneta_store::SqliteSubscriptionDirectory::new(
        rusqlite::Connection::open(db_path)?,
    ));

    let transport = Arc::new(moneta_push::WebPushClient::new(config.push.ttl_secs));

    let dispatcher = moneta_scheduler::Dispatcher::new(
        plans.clone(),
        ledger,
        subscriptions.clone(),
        transport,
        chrono::Duration::seconds(config.scheduler.lookahead_secs as i64),
        std::time::Duration::from_secs(config.scheduler.delivery_timeout_secs),
    );

    let state = Arc::new(app::AppState::new(config, dispatcher, plans, subscriptions));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!(%addr, "moneta gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(dir = %parent.display(), "could not create database directory: {e}");
        }
    }
}
